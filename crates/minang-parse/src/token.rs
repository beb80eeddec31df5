use minang_ast::span::Pos;

#[derive(Debug, Clone, PartialEq)]
pub enum TokKind {
    // structure
    Newline,
    Eof,
    // literals
    Number(f64),
    Str(String),
    Regex { pattern: String, flags: String },
    TemplateString(String),
    TemplateExprStart,
    TemplateExprEnd,
    Ident(String),
    // core keywords
    KwVar,
    KwLet,
    KwConst,
    KwFunction,
    KwReturn,
    KwIf,
    KwElse,
    KwElseIf,
    KwWhile,
    KwFor,
    KwBreak,
    KwContinue,
    KwPrint,
    KwTrue,
    KwFalse,
    KwNull,
    // reserved words with no grammar of their own
    Reserved(Reserved),
    // operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    EqEq,
    BangEq,
    Lt,
    Gt,
    Le,
    Ge,
    AndAnd,
    OrOr,
    Bang,
    PlusPlus,
    MinusMinus,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    StarStar,
    QuestionDot,
    QuestionQuestion,
    FatArrow,
    // delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,
    Colon,
    Question,
    At,
    Hash,
}

/// Keywords the lexer recognises but the grammar does not use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reserved {
    Try,
    Catch,
    Finally,
    Throw,
    Switch,
    Case,
    Default,
    ClassName,
    Extends,
    Constructor,
    This,
    Static,
    Private,
    Public,
    Protected,
    Import,
    Export,
    Async,
    Await,
    Yield,
    Generator,
    Array,
    Object,
    StringType,
    NumberType,
    BooleanType,
    ArrayLiteral,
    ObjectLiteral,
    Document,
    Element,
    Selector,
    SelectAll,
    Create,
    Append,
    Remove,
    Replace,
    Listen,
    Fetch,
    Load,
    Click,
    Change,
    Style,
    Id,
    Content,
    Value,
    HttpGet,
    HttpPost,
    HttpPut,
    HttpDelete,
    Json,
    Form,
    Input,
}

impl Reserved {
    pub fn name(self) -> &'static str {
        use Reserved::*;
        match self {
            Try => "TRY",
            Catch => "CATCH",
            Finally => "FINALLY",
            Throw => "THROW",
            Switch => "SWITCH",
            Case => "CASE",
            Default => "DEFAULT",
            ClassName => "CLASS_NAME",
            Extends => "EXTENDS",
            Constructor => "CONSTRUCTOR",
            This => "THIS",
            Static => "STATIC",
            Private => "PRIVATE",
            Public => "PUBLIC",
            Protected => "PROTECTED",
            Import => "IMPORT",
            Export => "EXPORT",
            Async => "ASYNC",
            Await => "AWAIT",
            Yield => "YIELD",
            Generator => "GENERATOR",
            Array => "ARRAY",
            Object => "OBJECT",
            StringType => "STRING_TYPE",
            NumberType => "NUMBER_TYPE",
            BooleanType => "BOOLEAN_TYPE",
            ArrayLiteral => "ARRAY_LITERAL",
            ObjectLiteral => "OBJECT_LITERAL",
            Document => "DOCUMENT",
            Element => "ELEMENT",
            Selector => "SELECTOR",
            SelectAll => "SELECT_ALL",
            Create => "CREATE",
            Append => "APPEND",
            Remove => "REMOVE",
            Replace => "REPLACE",
            Listen => "LISTEN",
            Fetch => "FETCH",
            Load => "LOAD",
            Click => "CLICK",
            Change => "CHANGE",
            Style => "STYLE",
            Id => "ID",
            Content => "CONTENT",
            Value => "VALUE",
            HttpGet => "HTTP_GET",
            HttpPost => "HTTP_POST",
            HttpPut => "HTTP_PUT",
            HttpDelete => "HTTP_DELETE",
            Json => "JSON",
            Form => "FORM",
            Input => "INPUT",
        }
    }
}

/// The fixed keyword table.
pub fn keyword(word: &str) -> Option<TokKind> {
    use Reserved::*;
    let kind = match word {
        "buek" => TokKind::KwVar,
        "ambiak" => TokKind::KwLet,
        "tagak" => TokKind::KwConst,
        "karojo" => TokKind::KwFunction,
        "jadi" => TokKind::KwReturn,
        "kalau" => TokKind::KwIf,
        "lain" => TokKind::KwElse,
        "kalauLain" => TokKind::KwElseIf,
        "selamo" => TokKind::KwWhile,
        "untuak" => TokKind::KwFor,
        "baronti" => TokKind::KwBreak,
        "lanjuik" => TokKind::KwContinue,
        "cetak" => TokKind::KwPrint,
        "bana" => TokKind::KwTrue,
        "salah" => TokKind::KwFalse,
        "kosong" => TokKind::KwNull,
        "cubo" => TokKind::Reserved(Try),
        "tangkok" => TokKind::Reserved(Catch),
        "akhianyo" => TokKind::Reserved(Finally),
        "lampaik" => TokKind::Reserved(Throw),
        "piliah" => TokKind::Reserved(Switch),
        "kasus" => TokKind::Reserved(Case),
        "default" => TokKind::Reserved(Default),
        "kelas" => TokKind::Reserved(ClassName),
        "warisan" => TokKind::Reserved(Extends),
        "konstruktor" => TokKind::Reserved(Constructor),
        "ini" => TokKind::Reserved(This),
        "statik" => TokKind::Reserved(Static),
        "privat" => TokKind::Reserved(Private),
        "publik" => TokKind::Reserved(Public),
        "dilindungi" => TokKind::Reserved(Protected),
        "impor" => TokKind::Reserved(Import),
        "ekspor" => TokKind::Reserved(Export),
        "async" => TokKind::Reserved(Async),
        "tunggu" => TokKind::Reserved(Await),
        "yield" => TokKind::Reserved(Yield),
        "generator" => TokKind::Reserved(Generator),
        "array" => TokKind::Reserved(Array),
        "objek" => TokKind::Reserved(Object),
        "string" => TokKind::Reserved(StringType),
        "angka" => TokKind::Reserved(NumberType),
        "boolean" => TokKind::Reserved(BooleanType),
        "kumpulan" => TokKind::Reserved(ArrayLiteral),
        "benda" => TokKind::Reserved(ObjectLiteral),
        "dokumen" => TokKind::Reserved(Document),
        "elemen" => TokKind::Reserved(Element),
        "cari" => TokKind::Reserved(Selector),
        "pilihSemua" => TokKind::Reserved(SelectAll),
        "buat" => TokKind::Reserved(Create),
        "tambah" => TokKind::Reserved(Append),
        "hapus" => TokKind::Reserved(Remove),
        "ganti" => TokKind::Reserved(Replace),
        "dengar" => TokKind::Reserved(Listen),
        "kirim" => TokKind::Reserved(Fetch),
        "muat" => TokKind::Reserved(Load),
        "klik" => TokKind::Reserved(Click),
        "ubah" => TokKind::Reserved(Change),
        "style" => TokKind::Reserved(Style),
        "id" => TokKind::Reserved(Id),
        "konten" => TokKind::Reserved(Content),
        "nilai" => TokKind::Reserved(Value),
        "get" => TokKind::Reserved(HttpGet),
        "post" => TokKind::Reserved(HttpPost),
        "put" => TokKind::Reserved(HttpPut),
        "delete" => TokKind::Reserved(HttpDelete),
        "json" => TokKind::Reserved(Json),
        "form" => TokKind::Reserved(Form),
        "input" => TokKind::Reserved(Input),
        _ => return None,
    };
    Some(kind)
}

/// Two-character operators, probed before the single-character table.
pub fn two_char_op(a: char, b: char) -> Option<TokKind> {
    let kind = match (a, b) {
        ('=', '=') => TokKind::EqEq,
        ('!', '=') => TokKind::BangEq,
        ('<', '=') => TokKind::Le,
        ('>', '=') => TokKind::Ge,
        ('&', '&') => TokKind::AndAnd,
        ('|', '|') => TokKind::OrOr,
        ('+', '+') => TokKind::PlusPlus,
        ('-', '-') => TokKind::MinusMinus,
        ('+', '=') => TokKind::PlusAssign,
        ('-', '=') => TokKind::MinusAssign,
        ('*', '=') => TokKind::StarAssign,
        ('/', '=') => TokKind::SlashAssign,
        ('*', '*') => TokKind::StarStar,
        ('?', '.') => TokKind::QuestionDot,
        ('?', '?') => TokKind::QuestionQuestion,
        ('=', '>') => TokKind::FatArrow,
        _ => return None,
    };
    Some(kind)
}

/// Single-character operators and delimiters.
pub fn one_char(c: char) -> Option<TokKind> {
    let kind = match c {
        '+' => TokKind::Plus,
        '-' => TokKind::Minus,
        '*' => TokKind::Star,
        '/' => TokKind::Slash,
        '%' => TokKind::Percent,
        '=' => TokKind::Assign,
        '<' => TokKind::Lt,
        '>' => TokKind::Gt,
        '!' => TokKind::Bang,
        '(' => TokKind::LParen,
        ')' => TokKind::RParen,
        '{' => TokKind::LBrace,
        '}' => TokKind::RBrace,
        '[' => TokKind::LBracket,
        ']' => TokKind::RBracket,
        ',' => TokKind::Comma,
        ';' => TokKind::Semicolon,
        '.' => TokKind::Dot,
        ':' => TokKind::Colon,
        '?' => TokKind::Question,
        '@' => TokKind::At,
        '#' => TokKind::Hash,
        _ => return None,
    };
    Some(kind)
}

impl TokKind {
    /// Stable upper-case name used in diagnostics and token dumps.
    pub fn name(&self) -> &'static str {
        match self {
            TokKind::Newline => "NEWLINE",
            TokKind::Eof => "EOF",
            TokKind::Number(_) => "NUMBER",
            TokKind::Str(_) => "STRING",
            TokKind::Regex { .. } => "REGEX",
            TokKind::TemplateString(_) => "TEMPLATE_STRING",
            TokKind::TemplateExprStart => "TEMPLATE_EXPR_START",
            TokKind::TemplateExprEnd => "TEMPLATE_EXPR_END",
            TokKind::Ident(_) => "IDENTIFIER",
            TokKind::KwVar => "VAR",
            TokKind::KwLet => "LET",
            TokKind::KwConst => "CONST",
            TokKind::KwFunction => "FUNCTION",
            TokKind::KwReturn => "RETURN",
            TokKind::KwIf => "IF",
            TokKind::KwElse => "ELSE",
            TokKind::KwElseIf => "ELSEIF",
            TokKind::KwWhile => "WHILE",
            TokKind::KwFor => "FOR",
            TokKind::KwBreak => "BREAK",
            TokKind::KwContinue => "CONTINUE",
            TokKind::KwPrint => "PRINT",
            TokKind::KwTrue => "TRUE",
            TokKind::KwFalse => "FALSE",
            TokKind::KwNull => "NULL",
            TokKind::Reserved(r) => r.name(),
            TokKind::Plus => "PLUS",
            TokKind::Minus => "MINUS",
            TokKind::Star => "MULTIPLY",
            TokKind::Slash => "DIVIDE",
            TokKind::Percent => "MODULO",
            TokKind::Assign => "ASSIGN",
            TokKind::EqEq => "EQUAL",
            TokKind::BangEq => "NOT_EQUAL",
            TokKind::Lt => "LESS_THAN",
            TokKind::Gt => "GREATER_THAN",
            TokKind::Le => "LESS_EQUAL",
            TokKind::Ge => "GREATER_EQUAL",
            TokKind::AndAnd => "AND",
            TokKind::OrOr => "OR",
            TokKind::Bang => "NOT",
            TokKind::PlusPlus => "INCREMENT",
            TokKind::MinusMinus => "DECREMENT",
            TokKind::PlusAssign => "PLUS_ASSIGN",
            TokKind::MinusAssign => "MINUS_ASSIGN",
            TokKind::StarAssign => "MULTIPLY_ASSIGN",
            TokKind::SlashAssign => "DIVIDE_ASSIGN",
            TokKind::StarStar => "POWER",
            TokKind::QuestionDot => "OPTIONAL_CHAIN",
            TokKind::QuestionQuestion => "NULLISH_COALESCING",
            TokKind::FatArrow => "ARROW",
            TokKind::LParen => "LPAREN",
            TokKind::RParen => "RPAREN",
            TokKind::LBrace => "LBRACE",
            TokKind::RBrace => "RBRACE",
            TokKind::LBracket => "LBRACKET",
            TokKind::RBracket => "RBRACKET",
            TokKind::Comma => "COMMA",
            TokKind::Semicolon => "SEMICOLON",
            TokKind::Dot => "DOT",
            TokKind::Colon => "COLON",
            TokKind::Question => "QUESTION",
            TokKind::At => "AT",
            TokKind::Hash => "HASH",
        }
    }

    /// Whether a `/` following this token starts a regex literal.
    pub fn permits_regex(&self) -> bool {
        matches!(
            self,
            TokKind::Assign
                | TokKind::LParen
                | TokKind::Comma
                | TokKind::LBracket
                | TokKind::KwReturn
                | TokKind::Colon
                | TokKind::EqEq
                | TokKind::BangEq
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tok {
    pub kind: TokKind,
    pub pos: Pos,
}

impl Tok {
    pub fn line(&self) -> u32 {
        self.pos.line
    }

    pub fn column(&self) -> u32 {
        self.pos.column
    }
}

impl std::fmt::Display for Tok {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.kind.name();
        match &self.kind {
            TokKind::Number(n) => write!(f, "{} {}", name, minang_ast::num::format_number(*n))?,
            TokKind::Str(s) | TokKind::TemplateString(s) => write!(f, "{} {:?}", name, s)?,
            TokKind::Ident(s) => write!(f, "{} {}", name, s)?,
            TokKind::Regex { pattern, flags } => write!(f, "{} /{}/{}", name, pattern, flags)?,
            _ => write!(f, "{}", name)?,
        }
        write!(f, " ({})", self.pos)
    }
}
