//! Instructional templates for each counseling strategy.
//!
//! Each template describes the selected dialogue-act for the generator,
//! with worked examples. Resolution is total over the strategy
//! enumeration; a missing template is an enumeration-mismatch bug and
//! fails loudly.

use motiva_core::error::TemplateError;
use motiva_core::turn::Strategy;
use std::collections::HashMap;

/// The strategy-to-template registry.
pub struct StrategyTemplates {
    templates: HashMap<Strategy, String>,
}

impl StrategyTemplates {
    /// The built-in MI instruction set.
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();

        templates.insert(
            Strategy::Affirm,
            "＃是認；AF\n\
             GPT は肯定的なあるいはほめるなにかをCl.に言う。それは評価， 信頼や強化の形で表されるかもしれない。GPT はuserの長所や努力に ついてコメントする。\n\
             ＃＃例\n\
             あなたは工夫が得意な方ですね”\n\
             “今日は話してくれてありがとう”\n\
             “あなたはずいぶんタバコを減らしたのですね”\n\
             “今日あなたとお話して楽しかったです”\n\
             user ：わたしにはできないと思います\n\
             GPT ：あなたは過去にいくつかの困難な変化を成し遂げてきました\n\
             “それはいい考えです”"
                .to_string(),
        );

        templates.insert(
            Strategy::EmphasizeControl,
            "＃コントロールを強調する；EC\n\
             GPT は直接的にuserの選択の自由，自律，個人的責任などを認め， 尊重し，強調する”誰もあなたを変えることはできません”のように否定形で表されてもよい。非難やあらさがしの調子はない。\n\
             ＃＃例\n\
             user：私は今週 5日間酒を飲みませんでした\n\
             GPT ：あなたがその選択をしたのです\n\
             “それはあなたが決めることです”\n\
             “あなたはなにが自分にとって一番いいか知っているはずです”"
                .to_string(),
        );

        templates.insert(
            Strategy::GiveInformation,
            "＃情報提供；GI\n\
             GPT はuserに情報を与え、なにかを説明し、教育し、フィードバックを与え、また個人的な情報を開示する。GPT が意見を言うが助言ではない時、このカテゴリーが使われる。情報提供の型の例で評価尺度からのフィードバックの提供、介入に関連する考えや概念の説明、トピックについての教育を含むものもある。\n\
             ＃＃例\n\
             “あなたは評価の間、典型的には週に約18標準ドリンク飲むことを示しました。これは男性同年齢の96パーセンタイルに位置します”\n\
             “飲酒したいという衝動の自己記録をつけるという宿題は重要です、なぜなら衝動は警告のベルのようなもので、あなたに目を覚ましてほかのことをしなさいと教えるからです”\n\
             “毎日5種類の果物と野菜を食べると癌リスクが5倍減ります。ある種の癌、たとえば大腸がんではさらに減少効果があります”\n\
             “もしあなたが麻薬を使ったと言った時には、わたしはそれをあなたの保護観察官に伝える義務があります”\n\
             “あなたは評価の間、普通週に約40標準ドリンク飲んでいることを示しました。これだけ多くの飲酒は遅かれ早かれあなたの健康を害するはずです”"
                .to_string(),
        );

        templates.insert(
            Strategy::Question,
            "＃質問；QU\n\
             GPT は情報収集，理解，Cl.の話を引き出すために質問をする。一般にこれらは疑問を示す語で始まる：誰，何，なぜ，いつ，どのように，どこで，など。\n\
             質問は閉じられた（QUC）か開かれた（QUO）のいずれかの下位分類を要する。 質問はまた命令の陳述言語でされる。\n\
             ＃＃例\n\
             user：わたしはこの関係に何が起きつつあるのかがはっきりわからないんです。ある時にはわれわれはうまくいってるようですし，ある時は破局状態です\n\
             GPT ：この関係はあなたにとっていい悪いが 混じったものだったのですよね？\n\
             “どうやったらそれができそう？”\n\
             “それについてあなたはどう感じますか？”\n\
             “肥満はあなたにどんなふうに問題を起こしてきましたか？ たとえば，あなた 自身について悪く感じたり，疎外感を味わったり，健康問題とか”\n\
             “あなたの喫煙について話してください”\n\
             ”週末以外はよかったんですか？”\n\
             “今週あなたはヘロインを使いましたか？”"
                .to_string(),
        );

        templates.insert(
            Strategy::Reframe,
            "＃リフレーム；RF\n\
             GPT はuserが述べた経験に新しい光を当て，異なる意味を与える。 これらは通常，否定から肯定へと，または肯定から否定へと意味の感情的価値を変化させる性質を持っている。リフレームは一般に聞き返しの基準を満たすが，実際に深さだけではなく意味のプラス・マイナスを変えることによって，意味や強調を加えるよりもさらに遠くへ進む。リフレームはuserに彼らの置かれている状況を違う視点から見るために新しい情報を提供することを含むことができる。\n\
             ＃＃例\n\
             user：夫は薬を飲めといつもガミガミ言うんです\n\
             GPT ：ご主人はあなたのことをとても心配しているようですね\n\
             user：妻と子どもたちは私がタバコをずいぶん減らしたのを知ってるん です。なのに私がタバコを吸うたび一言言うんです\n\
             GPT ：彼らが助けようとする努力はやめろという圧力に感じられるのですね\n\
             user：わたしにはできるかどうかわかりません。何度もやってみましたが，その時に先に取り組まないといけないなにかが起きるんです\n\
             GPT ：あな たははっきりした優先順位を持ってるんですね\n\
             user：前にやめようとしましたが失敗したんです\n\
             GPT ：やろうと試みるたびに成功に近づいていってますよ"
                .to_string(),
        );

        templates.insert(
            Strategy::Structure,
            "＃枠決め（ST）\n\
             治療の経過を通して，現在の、または、引き続くセッションでなにが起きるかについて直接userに情報提供する。\n\
             セッション中の部分から他の部分への移行を行う。\n\
             ＃＃例\n\
             “われわれは普通あなたの食習慣について質問することから始めます”\n\
             “さてあなたのやる気について話し合いたいのですが”\n\
             “このサービスではわたしはあなたに月2回お会いしセッションは保存されます”"
                .to_string(),
        );

        templates.insert(
            Strategy::SimpleReflection,
            "＃単純な聞き返し；SiR\n\
             聞き返しはuserの陳述への応答としてGPT が行なう聞き返しの陳述である。現在のあるいは以前のセッションのuserの発話を聞き返すことができる。聞き返しはuserの発言を捕らえてuserに返す。\n\
             聞き返しはuserが言ったことを単に繰り返したり言い換えることもできるし，新しい意味や材料を導入してもかまわない。\n\
             ＃＃例\n\
             user：で,できないです。\n\
             GPT ：できないよね\n\
             user：うつがひどくてずっと治らないんです。だから，もう死にたい。\n\
             GPT ：うつで死にたい。\n\
             user：ええ，死ぬしかないって思うんです。うつがひどいんでしょうか？\n\
             GPT ：死のことだけ考えるんですね。\n\
             user：ええ，ずっとそのことばかり頭に思い浮かんで。どうやったらうつが治るんでしょうか?\n\
             GPT ：うつの治し方を知りたいんですね。\n\
             user：わたしはこの関係に何が起きつつあるのかがはっきりわからないんです。ある時にはわれわれはうまくいってるようですし，ある時は破局状態で す\n\
             GPT ：この関係はあなたにとっていい悪いが混じったものだった\n\
             user：簡単なことではありませんでした\n\
             GPT ：あなたにはつらいことだった"
                .to_string(),
        );

        templates.insert(
            Strategy::DoubleSidedReflection,
            "＃両面を持った聞き返し (DR)\n\
             userの両面の気持ちやアンビバレンスを反映する。\n\
             ＃＃例\n\
             友達と飲むと初対面の人と話すのが楽になるけど、飲んだ後に疲れて二日酔いになるのが嫌なんですね\n\
             user：タバコは健康によくないと思いますが，ほんとうに私のストレス を減らすんです\n\
             GPT ：あなたは健康を心配であるが、気晴らしも必要としているんですね"
                .to_string(),
        );

        templates.insert(
            Strategy::MetaphoricalReflection,
            "＃比喩的な聞き返し；MR\n\
             userの主張に対して比喩やイメージを用いる。\n\
             ＃＃例\n\
             まるで進退窮まっているような感じですね。\n\
             user：みんなが酒のことでやかましく言うんです\n\
             GPT ：まるでカラスの群れにつつかれているみたい\n\
             user ：もう少し余裕をもって毎日を過ごしたいです。いつも慌ただしくて、時間に追われていて、 でも、仕事を断れなくて、何ていうかゆったりしたいんです\n\
             GPT ：毎日毎日働き蜂のように働き回っていると"
                .to_string(),
        );

        templates.insert(
            Strategy::AmplifiedReflection,
            "＃増幅した聞き返し；AR\n\
             userに聞き返す内容が強調されたり，強度が強められたり，誇張されたりされる。\n\
             ＃＃例\n\
             ”彼女には全く心配する理由がないと思っているんですね”\n\
             user：うん。で,とんでもないことをしちゃいそうな気がします。\n\
             GPT :うん。とんでもないことって,何か火をつけるとか物を盗るとか"
                .to_string(),
        );

        templates.insert(
            Strategy::SummarizingReflection,
            "＃要約した聞き返し；SuR\n\
             userの発話の最低でも二つ以上の聞き返しを，そして最低でひとつは直前ではない，以前の発言からのものを含めて，まとめたものである。"
                .to_string(),
        );

        Self { templates }
    }

    /// Resolve a strategy to its template text.
    pub fn resolve(&self, strategy: Strategy) -> Result<&str, TemplateError> {
        self.templates
            .get(&strategy)
            .map(|s| s.as_str())
            .ok_or(TemplateError::Missing(strategy))
    }

    /// Replace or add a template.
    pub fn insert(&mut self, strategy: Strategy, template: impl Into<String>) {
        self.templates.insert(strategy, template.into());
    }
}

impl Default for StrategyTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_strategy_has_a_template() {
        let templates = StrategyTemplates::builtin();
        for strategy in Strategy::ALL {
            let template = templates.resolve(strategy).unwrap();
            assert!(!template.trim().is_empty(), "{strategy} template empty");
        }
    }

    #[test]
    fn templates_name_their_code() {
        let templates = StrategyTemplates::builtin();
        for strategy in Strategy::ALL {
            let template = templates.resolve(strategy).unwrap();
            assert!(
                template.contains(strategy.code()),
                "{} template does not mention its code",
                strategy
            );
        }
    }

    #[test]
    fn missing_template_is_an_error() {
        let mut templates = StrategyTemplates::builtin();
        templates.templates.remove(&Strategy::Affirm);
        let err = templates.resolve(Strategy::Affirm).unwrap_err();
        assert!(matches!(err, TemplateError::Missing(Strategy::Affirm)));
    }

    #[test]
    fn insert_overrides() {
        let mut templates = StrategyTemplates::builtin();
        templates.insert(Strategy::Question, "ask gently");
        assert_eq!(templates.resolve(Strategy::Question).unwrap(), "ask gently");
    }
}
