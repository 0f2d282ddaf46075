//! Token definitions for HLSL.

use std::fmt;
use xshade_common::{SourceArea, SourcePosition};

/// A token produced by the scanner.
#[derive(Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The token spelling. For string literals this includes the quotes;
    /// for directives it is the directive name without the `#`.
    pub spell: String,
    pub area: SourceArea,
}

impl Token {
    pub fn new(kind: TokenKind, spell: impl Into<String>, pos: SourcePosition) -> Self {
        let spell = spell.into();
        let length = spell.chars().count().max(1) as u32;
        Self {
            kind,
            spell,
            area: SourceArea::new(pos, length),
        }
    }

    pub fn pos(&self) -> SourcePosition {
        self.area.pos
    }

    /// Returns true for tokens the parser never sees (whitespace,
    /// newlines, comments, line breaks).
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::WhiteSpace | TokenKind::NewLine | TokenKind::Comment | TokenKind::LineBreak
        )
    }

    /// String-literal content without the surrounding quotes.
    pub fn spell_content(&self) -> &str {
        if self.kind == TokenKind::StringLiteral {
            self.spell.trim_matches('"')
        } else {
            &self.spell
        }
    }

    /// Returns true if this token has the given kind and spelling.
    pub fn is(&self, kind: TokenKind, spell: &str) -> bool {
        self.kind == kind && self.spell == spell
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?}) @ {:?}", self.kind, self.spell, self.area)
    }
}

/// The kind of token. Closed enumeration; the spelling disambiguates
/// within operator and keyword classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `(letter | '_') (letter | '_' | digit)*`
    Ident,

    // Literals
    /// `true` | `false`
    BoolLiteral,
    /// Decimal or hexadecimal integer.
    IntLiteral,
    /// Decimal float, with optional exponent and `f`/`h` suffix.
    FloatLiteral,
    /// Double-quoted string.
    StringLiteral,

    // Operators
    /// `=`, `+=`, `-=`, `*=`, `/=`, `%=`, `<<=`, `>>=`, `|=`, `&=`, `^=`
    AssignOp,
    /// `&&`, `||`, `|`, `^`, `&`, `<<`, `>>`, `+`, `-`, `*`, `/`, `%`,
    /// `==`, `!=`, `<`, `>`, `<=`, `>=`
    BinaryOp,
    /// `!`, `~`, `++`, `--`
    UnaryOp,
    /// `?`
    TernaryOp,

    // Punctuation
    Dot,
    Colon,
    Semicolon,
    Comma,

    // Brackets
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    // Type keywords
    /// `string`
    StringType,
    /// `bool`, `int`, `uint`, `dword`, `half`, `float`, `double`
    ScalarType,
    /// Scalar type with a `1`-`4` suffix, e.g. `float3`.
    VectorType,
    /// Scalar type with an `MxN` suffix, e.g. `float4x4`.
    MatrixType,

    /// `sampler`, `sampler1D`, `sampler2D`, `sampler3D`, `samplerCUBE`
    Sampler,
    /// `sampler_state`, `SamplerState`, `SamplerComparisonState`
    SamplerState,
    /// `texture`, `Texture1D` .. `RWTexture3D`
    Texture,
    /// `Buffer`, `StructuredBuffer`, `ByteAddressBuffer`, RW variants, ...
    StorageBuffer,
    /// `cbuffer`, `tbuffer`
    UniformBuffer,

    /// `vector` (generic form `vector<float, 3>`)
    Vector,
    /// `matrix` (generic form `matrix<int, 4, 4>`)
    Matrix,
    /// `void`
    Void,

    // Keywords
    Do,
    While,
    For,
    If,
    Else,
    Switch,
    Case,
    Default,
    Typedef,
    Struct,
    Register,
    PackOffset,
    /// `break`, `continue`, `discard`
    CtrlTransfer,
    Return,
    /// `in`, `out`, `inout`, `uniform`
    InputModifier,
    /// `extern`, `static`, `groupshared`, `nointerpolation`, ...
    StorageClass,
    /// `const`, `row_major`, `column_major`
    TypeModifier,
    Inline,

    // Effect-framework keywords
    Technique,
    Pass,
    Compile,

    // Preprocessor tokens
    /// `#` IDENT; the spelling is the identifier.
    Directive,
    /// `##`
    DirectiveConcat,
    /// Line or block commentary.
    Comment,
    /// Spaces, tabs, carriage returns.
    WhiteSpace,
    /// `\n`
    NewLine,
    /// `\` immediately before a newline.
    LineBreak,
    /// `...`
    VarArg,

    /// End of the token stream.
    EndOfStream,
}

impl TokenKind {
    /// A descriptive name for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::BoolLiteral => "boolean literal",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::FloatLiteral => "floating-point literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::AssignOp => "assignment operator",
            TokenKind::BinaryOp => "binary operator",
            TokenKind::UnaryOp => "unary operator",
            TokenKind::TernaryOp => "'?'",
            TokenKind::Dot => "'.'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::StringType => "string type",
            TokenKind::ScalarType => "scalar type",
            TokenKind::VectorType => "vector type",
            TokenKind::MatrixType => "matrix type",
            TokenKind::Sampler => "sampler type",
            TokenKind::SamplerState => "sampler state",
            TokenKind::Texture => "texture type",
            TokenKind::StorageBuffer => "storage buffer type",
            TokenKind::UniformBuffer => "uniform buffer type",
            TokenKind::Vector => "'vector'",
            TokenKind::Matrix => "'matrix'",
            TokenKind::Void => "'void'",
            TokenKind::Do => "'do'",
            TokenKind::While => "'while'",
            TokenKind::For => "'for'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Switch => "'switch'",
            TokenKind::Case => "'case'",
            TokenKind::Default => "'default'",
            TokenKind::Typedef => "'typedef'",
            TokenKind::Struct => "'struct'",
            TokenKind::Register => "'register'",
            TokenKind::PackOffset => "'packoffset'",
            TokenKind::CtrlTransfer => "control-transfer keyword",
            TokenKind::Return => "'return'",
            TokenKind::InputModifier => "input modifier",
            TokenKind::StorageClass => "storage class",
            TokenKind::TypeModifier => "type modifier",
            TokenKind::Inline => "'inline'",
            TokenKind::Technique => "'technique'",
            TokenKind::Pass => "'pass'",
            TokenKind::Compile => "'compile'",
            TokenKind::Directive => "preprocessor directive",
            TokenKind::DirectiveConcat => "'##'",
            TokenKind::Comment => "comment",
            TokenKind::WhiteSpace => "whitespace",
            TokenKind::NewLine => "newline",
            TokenKind::LineBreak => "line break",
            TokenKind::VarArg => "'...'",
            TokenKind::EndOfStream => "end of stream",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}
