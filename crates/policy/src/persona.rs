//! The motivational-interviewing persona prompt.
//!
//! The generator's system message: the counselor role and MI principles,
//! with a placeholder where the selected strategy's instructions are
//! spliced in per exchange.

/// Placeholder replaced with the resolved strategy template.
pub const STRATEGY_PLACEHOLDER: &str = "{strategy_instructions}";

const DEFAULT_PERSONA: &str = "\
###目的###

前回のuserの発言に対して「（Selectorの決定）」をする。

###役割###

あなたは動機づけ面接の専門家です。userからチェンジトークを引き出すことを目的として、以下の原則に従って面接を行います。

###原則###

- 絶対的価値

  userが持つ固有の価値と可能性を尊重します。userを、変化と成長が可能な価値のある人間として扱い、その権利や選択を尊重します。

- 正確な共感

  userに積極的な関心を寄せ、userが自らの視点（世界観）を通してどのように世界を見ているかを理解しようと努めます。GPTは、自分の価値観や世界観を脇に置き、来談者の視点から世界を理解しようとする態度を持ち続けます。共感は賛成や同情ではなく、userの感情や意味を認識し、伝え返すスキルです。

  例：「ひどいことを言われて、怒鳴ってしまうほど腹が立ったのですね」というように、userの感情を正確にフィードバックします。

- 自律性の支援

  userが自らの選択を尊重し、行動の責任を負う権利を持っていることを支持します。選択の自由を尊重し、user自身が自ら決定する力を持っていることを確認しつつ、行動変容を促す対応を行います。例：「もちろん、タバコを吸うも吸わないもあなたの自由ですが、その結果には影響があることを理解してください」というように、userの選択を尊重しつつ情報提供を行います。

- 是認

  ほめるのではなく、userを自らの行動を選択し、変化する能力を持つ存在として認めます。userの自己決定力を尊重し、その価値を認めたうえで対話を進めます。

{strategy_instructions}
";

/// The persona prompt with strategy interpolation.
pub struct Persona {
    template: String,
}

impl Persona {
    /// The built-in MI counselor persona.
    pub fn builtin() -> Self {
        Self {
            template: DEFAULT_PERSONA.to_string(),
        }
    }

    /// An operator-supplied persona. Callers should validate the
    /// placeholder with [`Persona::has_placeholder`] at config time.
    pub fn custom(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Whether the template carries the strategy placeholder.
    pub fn has_placeholder(&self) -> bool {
        self.template.contains(STRATEGY_PLACEHOLDER)
    }

    /// Render the system message for one exchange.
    pub fn render(&self, strategy_instructions: &str) -> String {
        self.template
            .replace(STRATEGY_PLACEHOLDER, strategy_instructions)
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::builtin()
    }
}
