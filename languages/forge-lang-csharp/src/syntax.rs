//! Structural model of a C# compilation unit
//!
//! Every node is a plain owned value. Declarations the generator manages are
//! modeled field by field; everything else is carried as [`Verbatim`] text so
//! hand-written code survives a parse/print cycle untouched.

use crate::verbatim::{Trivia, Verbatim};
use forge_foundation::{ForgeError, ForgeResult};

/// A parsed C# file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTree {
    /// Comments before the first item, e.g. a generated-file banner
    pub header: Vec<Verbatim>,
    pub items: Vec<TopLevelItem>,
    /// Comments after the last item
    pub trailing: Trivia,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopLevelItem {
    pub trivia: Trivia,
    pub kind: TopLevelKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelKind {
    Using(UsingDirective),
    Namespace(NamespaceNode),
    Other(OpaqueNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingDirective {
    pub global: bool,
    /// Everything between `using` and `;`, e.g. `Terraria.ID` or `Alias = A.B`
    pub target: String,
}

impl UsingDirective {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            global: false,
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceStyle {
    /// `namespace A.B { ... }`
    Block,
    /// `namespace A.B;`
    FileScoped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceNode {
    pub name: String,
    pub style: NamespaceStyle,
    pub members: Vec<TypeMember>,
    pub trailing: Trivia,
}

impl NamespaceNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            style: NamespaceStyle::Block,
            members: Vec::new(),
            trailing: Trivia::none(),
        }
    }

    /// Classes declared directly in this namespace, with their member index
    pub fn classes(&self) -> impl Iterator<Item = (usize, &ClassNode)> {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(index, member)| match &member.kind {
                TypeMemberKind::Class(class) => Some((index, class)),
                TypeMemberKind::Other(_) => None,
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeMember {
    pub trivia: Trivia,
    pub kind: TypeMemberKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeMemberKind {
    Class(ClassNode),
    Other(OpaqueNode),
}

/// A node kept as text, tagged with its tree-sitter kind and name if any
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueNode {
    pub kind: String,
    pub name: Option<String>,
    pub source: Verbatim,
}

impl OpaqueNode {
    pub fn comment(source: Verbatim) -> Self {
        Self {
            kind: "comment".to_string(),
            name: None,
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassNode {
    pub attributes: Vec<Verbatim>,
    pub modifiers: Vec<String>,
    pub identifier: String,
    /// Including the angle brackets
    pub type_parameters: Option<String>,
    /// Primary constructor parameter list, including parentheses
    pub parameters: Option<String>,
    pub base_types: Vec<String>,
    pub constraints: Vec<String>,
    pub members: Vec<MemberNode>,
    pub trailing: Trivia,
}

impl ClassNode {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            attributes: Vec::new(),
            modifiers: Vec::new(),
            identifier: identifier.into(),
            type_parameters: None,
            parameters: None,
            base_types: Vec::new(),
            constraints: Vec::new(),
            members: Vec::new(),
            trailing: Trivia::none(),
        }
    }

    /// The first entry of the base list, the direct base type when it is a class
    pub fn direct_base(&self) -> Option<&str> {
        self.base_types.first().map(String::as_str)
    }

    /// Indices of every method member called `name`
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.members
            .iter()
            .enumerate()
            .filter(move |(_, member)| member.is_method_named(name))
            .map(|(index, _)| index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Constructor,
    Property,
    Field,
    Event,
    Type,
    Comment,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberBody {
    /// Read from source. `method` is the structural view when the member is
    /// a method the parser fully understood.
    Parsed {
        source: Verbatim,
        method: Option<MethodDecl>,
    },
    /// Built by the generator and printed structurally
    Synthesized(MethodDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberNode {
    pub trivia: Trivia,
    pub kind: MemberKind,
    pub name: Option<String>,
    pub body: MemberBody,
}

impl MemberNode {
    /// A generator-built method member
    pub fn method(decl: MethodDecl) -> Self {
        Self {
            trivia: Trivia::none(),
            kind: MemberKind::Method,
            name: Some(decl.name.clone()),
            body: MemberBody::Synthesized(decl),
        }
    }

    pub fn is_method_named(&self, name: &str) -> bool {
        self.kind == MemberKind::Method && self.name.as_deref() == Some(name)
    }

    pub fn method_decl(&self) -> Option<&MethodDecl> {
        match &self.body {
            MemberBody::Parsed { method, .. } => method.as_ref(),
            MemberBody::Synthesized(decl) => Some(decl),
        }
    }

    pub fn is_synthesized(&self) -> bool {
        matches!(self.body, MemberBody::Synthesized(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub attributes: Vec<Verbatim>,
    pub modifiers: Vec<String>,
    pub return_type: String,
    pub name: String,
    pub type_parameters: Option<String>,
    /// Each parameter as written, without the surrounding parentheses
    pub parameters: Vec<String>,
    pub constraints: Vec<String>,
    pub body: MethodBody,
}

impl MethodDecl {
    pub fn new(
        modifiers: &[&str],
        return_type: impl Into<String>,
        name: impl Into<String>,
        body: MethodBody,
    ) -> Self {
        Self {
            attributes: Vec::new(),
            modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
            return_type: return_type.into(),
            name: name.into(),
            type_parameters: None,
            parameters: Vec::new(),
            constraints: Vec::new(),
            body,
        }
    }

    /// Statements of a block body; empty for other body forms
    pub fn statements(&self) -> &[Statement] {
        match &self.body {
            MethodBody::Block(block) => &block.statements,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MethodBody {
    Block(Block),
    /// `=> expr;`
    Expression(Expression),
    /// `;` only, as on abstract or partial declarations
    Declaration,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub trailing: Trivia,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            trailing: Trivia::none(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub trivia: Trivia,
    pub kind: StatementKind,
}

impl Statement {
    pub fn expression(expression: Expression) -> Self {
        Self {
            trivia: Trivia::none(),
            kind: StatementKind::Expression(expression),
        }
    }

    pub fn returns(value: Option<Expression>) -> Self {
        Self {
            trivia: Trivia::none(),
            kind: StatementKind::Return(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Expression(Expression),
    Return(Option<Expression>),
    Other(Verbatim),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    MemberAccess {
        target: Box<Expression>,
        member: String,
    },
    Invocation {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Assignment {
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Literal(Literal),
    Other(Verbatim),
}

impl Expression {
    /// Build `A.B.C` as nested member accesses
    pub fn path(dotted: &str) -> Self {
        let mut segments = dotted.split('.').map(str::trim);
        let first = segments.next().unwrap_or_default();
        segments.fold(Expression::Identifier(first.to_string()), |target, member| {
            Expression::MemberAccess {
                target: Box::new(target),
                member: member.to_string(),
            }
        })
    }

    pub fn call(callee: Expression, arguments: Vec<Expression>) -> Self {
        Expression::Invocation {
            callee: Box::new(callee),
            arguments,
        }
    }

    pub fn assign(target: Expression, value: Expression) -> Self {
        Expression::Assignment {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// The dotted name of an identifier or member-access chain
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Expression::Identifier(name) => Some(name.clone()),
            Expression::MemberAccess { target, member } => {
                target.dotted_name().map(|t| format!("{}.{}", t, member))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Character,
    Integer,
    Real,
    Boolean,
    Null,
}

/// A literal as its source token
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub token: String,
}

impl Literal {
    /// A regular string literal holding `value`, escaped as needed
    pub fn string(value: &str) -> Self {
        let mut token = String::with_capacity(value.len() + 2);
        token.push('"');
        for ch in value.chars() {
            match ch {
                '"' => token.push_str("\\\""),
                '\\' => token.push_str("\\\\"),
                '\n' => token.push_str("\\n"),
                '\r' => token.push_str("\\r"),
                '\t' => token.push_str("\\t"),
                '\0' => token.push_str("\\0"),
                c if c.is_control() => token.push_str(&format!("\\u{:04x}", c as u32)),
                c => token.push(c),
            }
        }
        token.push('"');
        Self {
            kind: LiteralKind::String,
            token,
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            kind: LiteralKind::Integer,
            token: value.to_string(),
        }
    }

    /// A `float` literal, written with the `f` suffix
    pub fn float(value: f64) -> Self {
        Self {
            kind: LiteralKind::Real,
            token: format!("{}f", value),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            kind: LiteralKind::Boolean,
            token: value.to_string(),
        }
    }

    /// Decoded value of a regular (non-verbatim, non-interpolated) string
    pub fn string_value(&self) -> Option<String> {
        if self.kind != LiteralKind::String {
            return None;
        }
        let inner = self.token.strip_prefix('"')?.strip_suffix('"')?;
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            let decoded = match chars.next()? {
                '"' => '"',
                '\'' => '\'',
                '\\' => '\\',
                '0' => '\0',
                'a' => '\u{7}',
                'b' => '\u{8}',
                'f' => '\u{c}',
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                'v' => '\u{b}',
                'u' => hex_char(&mut chars, 4, 4)?,
                'U' => hex_char(&mut chars, 8, 8)?,
                'x' => hex_char(&mut chars, 1, 4)?,
                _ => return None,
            };
            out.push(decoded);
        }
        Some(out)
    }
}

fn hex_char(chars: &mut std::str::Chars<'_>, min: usize, max: usize) -> Option<char> {
    let mut hex = String::new();
    while hex.len() < max {
        match chars.clone().next() {
            Some(h) if h.is_ascii_hexdigit() => {
                hex.push(h);
                chars.next();
            }
            _ => break,
        }
    }
    if hex.len() < min {
        return None;
    }
    char::from_u32(u32::from_str_radix(&hex, 16).ok()?)
}

/// Position of a class inside a [`SourceTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassPosition {
    /// Index into [`SourceTree::items`]
    pub namespace: usize,
    /// Index into [`NamespaceNode::members`]
    pub class: usize,
}

impl SourceTree {
    /// Top-level namespaces with their item index
    pub fn namespaces(&self) -> impl Iterator<Item = (usize, &NamespaceNode)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match &item.kind {
                TopLevelKind::Namespace(ns) => Some((index, ns)),
                _ => None,
            })
    }

    pub fn usings(&self) -> impl Iterator<Item = &UsingDirective> {
        self.items.iter().filter_map(|item| match &item.kind {
            TopLevelKind::Using(using) => Some(using),
            _ => None,
        })
    }

    pub fn class_at(&self, position: ClassPosition) -> Option<&ClassNode> {
        match &self.items.get(position.namespace)?.kind {
            TopLevelKind::Namespace(ns) => match &ns.members.get(position.class)?.kind {
                TypeMemberKind::Class(class) => Some(class),
                TypeMemberKind::Other(_) => None,
            },
            _ => None,
        }
    }

    /// Rebuild the tree with the class at `position` swapped for `class`.
    ///
    /// Every other node moves into the new tree unchanged.
    pub fn replace_class(self, position: ClassPosition, class: ClassNode) -> ForgeResult<Self> {
        let SourceTree {
            header,
            items,
            trailing,
        } = self;

        let mut replacement = Some(class);
        let items = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                if index != position.namespace {
                    return item;
                }
                match item.kind {
                    TopLevelKind::Namespace(ns) => TopLevelItem {
                        trivia: item.trivia,
                        kind: TopLevelKind::Namespace(replace_member(
                            ns,
                            position.class,
                            &mut replacement,
                        )),
                    },
                    kind => TopLevelItem {
                        trivia: item.trivia,
                        kind,
                    },
                }
            })
            .collect();

        if replacement.is_some() {
            return Err(ForgeError::internal(format!(
                "No class at namespace item {} member {}",
                position.namespace, position.class
            )));
        }

        Ok(SourceTree {
            header,
            items,
            trailing,
        })
    }
}

fn replace_member(
    ns: NamespaceNode,
    position: usize,
    replacement: &mut Option<ClassNode>,
) -> NamespaceNode {
    let NamespaceNode {
        name,
        style,
        members,
        trailing,
    } = ns;

    let members = members
        .into_iter()
        .enumerate()
        .map(|(index, member)| match member.kind {
            TypeMemberKind::Class(existing) if index == position => {
                let class = replacement.take().unwrap_or(existing);
                TypeMember {
                    trivia: member.trivia,
                    kind: TypeMemberKind::Class(class),
                }
            }
            kind => TypeMember {
                trivia: member.trivia,
                kind,
            },
        })
        .collect();

    NamespaceNode {
        name,
        style,
        members,
        trailing,
    }
}
