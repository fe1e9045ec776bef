//! tree-sitter backed C# parsing
//!
//! The concrete syntax tree is walked once and folded into a [`SourceTree`].
//! Only namespaces, classes, methods and simple statements get a structural
//! form; any other node is captured as [`Verbatim`] text. Comments are
//! attached as leading trivia to the node that directly follows them, or kept
//! as free-standing entries when a blank line separates them from it.

use crate::syntax::{
    Block, ClassNode, Expression, Literal, LiteralKind, MemberBody, MemberKind, MemberNode,
    MethodBody, MethodDecl, NamespaceNode, NamespaceStyle, OpaqueNode, SourceTree, Statement,
    StatementKind, TopLevelItem, TopLevelKind, TypeMember, TypeMemberKind, UsingDirective,
};
use crate::verbatim::{Trivia, Verbatim, PINNED_KINDS};
use forge_foundation::{ForgeError, ForgeResult};
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use tracing::debug;
use tree_sitter::{Node, Parser};

/// Modifier keywords, for grammars that expose them as bare tokens
const MODIFIER_KEYWORDS: &[&str] = &[
    "abstract", "async", "const", "extern", "file", "fixed", "internal", "new", "override",
    "partial", "private", "protected", "public", "readonly", "ref", "required", "sealed",
    "static", "unsafe", "virtual", "volatile",
];

/// Get the C# language for tree-sitter
fn get_language() -> tree_sitter::Language {
    tree_sitter_c_sharp::LANGUAGE.into()
}

/// Reusable C# parser
pub struct CsharpParser {
    parser: Parser,
}

impl CsharpParser {
    pub fn new() -> ForgeResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&get_language())
            .map_err(|e| ForgeError::internal(format!("Failed to load C# grammar: {}", e)))?;
        Ok(Self { parser })
    }

    /// Parse `source` into a [`SourceTree`].
    ///
    /// Source with syntax errors is rejected with the position of the first
    /// offending node.
    pub fn parse(&mut self, source: &str) -> ForgeResult<SourceTree> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ForgeError::internal("Failed to parse C# source"))?;
        let root = tree.root_node();

        if root.has_error() {
            return Err(syntax_error(source, root));
        }

        let builder = TreeBuilder::new(source, root);
        let parsed = builder.compilation_unit(root);
        debug!(
            items = parsed.items.len(),
            header_comments = parsed.header.len(),
            "Parsed C# source"
        );
        Ok(parsed)
    }
}

/// Parse C# source with a fresh parser
pub fn parse_source(source: &str) -> ForgeResult<SourceTree> {
    CsharpParser::new()?.parse(source)
}

fn syntax_error(source: &str, root: Node<'_>) -> ForgeError {
    let Some(node) = first_error(root) else {
        return ForgeError::parse_at("syntax error", 1, 1);
    };
    let position = node.start_position();
    let message = if node.is_missing() {
        format!("missing '{}'", node.kind())
    } else {
        let snippet: String = source[node.byte_range()]
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(40)
            .collect();
        format!("unexpected '{}'", snippet)
    };
    ForgeError::parse_at(message, position.row + 1, position.column + 1)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    children(node)
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Row of the last character of `node`. Preprocessor directives end with
/// their line break, which tree-sitter reports as column 0 of the next row.
fn last_row(node: Node<'_>) -> usize {
    let end = node.end_position();
    if end.column == 0 && end.row > node.start_position().row {
        end.row - 1
    } else {
        end.row
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_pinned(node: Node<'_>, source: &str, out: &mut Vec<Range<usize>>) {
    if PINNED_KINDS.contains(&node.kind()) {
        if source[node.byte_range()].contains('\n') {
            out.push(node.byte_range());
        }
        return;
    }
    for child in named_children(node) {
        collect_pinned(child, source, out);
    }
}

/// Nodes printed from their fields rather than their text; a comment on the
/// same line after one of these stays a separate entry
const STRUCTURAL_KINDS: &[&str] = &[
    "using_directive",
    "namespace_declaration",
    "file_scoped_namespace_declaration",
    "class_declaration",
];

/// Same-line comments that extend the node before them
#[derive(Default)]
struct InlineComments {
    /// Node id to the end byte of its last same-line comment
    ends: HashMap<usize, usize>,
    /// Comment ids absorbed into a preceding node
    absorbed: HashSet<usize>,
}

impl InlineComments {
    fn collect(&mut self, node: Node<'_>) {
        let mut anchor: Option<Node<'_>> = None;
        for child in named_children(node) {
            match anchor {
                Some(prev)
                    if child.kind() == "comment"
                        && child.start_position().row == last_row(prev) =>
                {
                    self.ends.insert(prev.id(), child.end_byte());
                    self.absorbed.insert(child.id());
                }
                _ => {
                    anchor = (child.kind() != "comment"
                        && !STRUCTURAL_KINDS.contains(&child.kind()))
                    .then_some(child);
                }
            }
            self.collect(child);
        }
    }
}

/// A child of a container, after comment grouping
enum Entry<'t> {
    Node { trivia: Trivia, node: Node<'t> },
    /// Comments set apart from the next node by a blank line
    Comments { blank_line: bool, source: Verbatim },
}

struct Sequence<'t> {
    entries: Vec<Entry<'t>>,
    trailing: Trivia,
}

struct TreeBuilder<'s> {
    source: &'s str,
    pinned: Vec<Range<usize>>,
    inline: InlineComments,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s str, root: Node<'_>) -> Self {
        let mut pinned = Vec::new();
        collect_pinned(root, source, &mut pinned);
        let mut inline = InlineComments::default();
        inline.collect(root);
        Self {
            source,
            pinned,
            inline,
        }
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn verbatim(&self, node: Node<'_>) -> Verbatim {
        let end = self
            .inline
            .ends
            .get(&node.id())
            .copied()
            .unwrap_or_else(|| node.end_byte());
        Verbatim::capture(self.source, node.start_byte()..end, &self.pinned)
    }

    fn comment_group(&self, comments: &[Node<'_>]) -> Verbatim {
        match (comments.first(), comments.last()) {
            (Some(first), Some(last)) => Verbatim::capture(
                self.source,
                first.start_byte()..last.end_byte(),
                &self.pinned,
            ),
            _ => Verbatim::from_text(""),
        }
    }

    /// Group `nodes` into entries, attaching comments to what follows them.
    ///
    /// `prev_row` is the row of the token before the first node (the opening
    /// brace of a body), used to detect a leading blank line.
    fn sequence<'t>(&self, nodes: &[Node<'t>], mut prev_row: Option<usize>) -> Sequence<'t> {
        let mut entries = Vec::new();
        let mut pending: Vec<Node<'t>> = Vec::new();
        let mut pending_blank = false;

        for &node in nodes {
            if self.inline.absorbed.contains(&node.id()) {
                continue;
            }
            let blank = prev_row.is_some_and(|row| node.start_position().row > row + 1);

            if node.kind() == "comment" {
                if pending.is_empty() {
                    pending_blank = blank;
                } else if blank {
                    entries.push(Entry::Comments {
                        blank_line: pending_blank,
                        source: self.comment_group(&pending),
                    });
                    pending.clear();
                    pending_blank = true;
                }
                pending.push(node);
            } else {
                let trivia = if pending.is_empty() {
                    Trivia {
                        blank_line: blank,
                        comments: Vec::new(),
                    }
                } else if blank {
                    entries.push(Entry::Comments {
                        blank_line: pending_blank,
                        source: self.comment_group(&pending),
                    });
                    pending.clear();
                    Trivia::spaced()
                } else {
                    Trivia {
                        blank_line: pending_blank,
                        comments: pending.drain(..).map(|c| self.verbatim(c)).collect(),
                    }
                };
                entries.push(Entry::Node { trivia, node });
            }

            prev_row = Some(last_row(node));
        }

        let trailing = Trivia {
            blank_line: pending_blank,
            comments: pending.iter().map(|c| self.verbatim(*c)).collect(),
        };
        Sequence { entries, trailing }
    }

    /// Comments written inside a declaration header, before its body
    fn hoisted_comments(&self, node: Node<'_>) -> Vec<Verbatim> {
        children(node)
            .into_iter()
            .take_while(|child| child.kind() != "declaration_list")
            .filter(|child| {
                child.kind() == "comment" && !self.inline.absorbed.contains(&child.id())
            })
            .map(|child| self.verbatim(child))
            .collect()
    }

    fn opaque(&self, node: Node<'_>) -> OpaqueNode {
        OpaqueNode {
            kind: node.kind().to_string(),
            name: node
                .child_by_field_name("name")
                .map(|n| normalize_whitespace(self.text(n))),
            source: self.verbatim(node),
        }
    }

    fn compilation_unit(&self, root: Node<'_>) -> SourceTree {
        let nodes = named_children(root);
        let sequence = self.sequence(&nodes, None);

        let mut header = Vec::new();
        let mut items: Vec<TopLevelItem> = Vec::new();
        let mut file_scoped: Option<(Trivia, NamespaceNode)> = None;

        for entry in sequence.entries {
            match entry {
                Entry::Comments { blank_line, source } => {
                    if items.is_empty() && file_scoped.is_none() {
                        header.push(source);
                    } else if let Some((_, ns)) = file_scoped.as_mut() {
                        ns.members.push(TypeMember {
                            trivia: spacing(blank_line),
                            kind: TypeMemberKind::Other(OpaqueNode::comment(source)),
                        });
                    } else {
                        items.push(TopLevelItem {
                            trivia: spacing(blank_line),
                            kind: TopLevelKind::Other(OpaqueNode::comment(source)),
                        });
                    }
                }
                Entry::Node { mut trivia, node } => {
                    if items.is_empty() && file_scoped.is_none() {
                        header.append(&mut trivia.comments);
                    }

                    if let Some((_, ns)) = file_scoped.as_mut() {
                        ns.members.push(self.type_member(trivia, node));
                        continue;
                    }

                    let kind = match node.kind() {
                        "using_directive" => match self.using_directive(node) {
                            Some(using) => TopLevelKind::Using(using),
                            None => TopLevelKind::Other(self.opaque(node)),
                        },
                        "namespace_declaration" => {
                            trivia.comments.extend(self.hoisted_comments(node));
                            TopLevelKind::Namespace(self.block_namespace(node))
                        }
                        "file_scoped_namespace_declaration" => {
                            trivia.comments.extend(self.hoisted_comments(node));
                            file_scoped = Some((trivia, self.file_scoped_namespace(node)));
                            continue;
                        }
                        _ => TopLevelKind::Other(self.opaque(node)),
                    };
                    items.push(TopLevelItem { trivia, kind });
                }
            }
        }

        let mut trailing = sequence.trailing;
        if let Some((trivia, mut ns)) = file_scoped {
            ns.trailing = std::mem::take(&mut trailing);
            items.push(TopLevelItem {
                trivia,
                kind: TopLevelKind::Namespace(ns),
            });
        } else if items.is_empty() {
            header.append(&mut trailing.comments);
            trailing = Trivia::none();
        }

        SourceTree {
            header,
            items,
            trailing,
        }
    }

    fn using_directive(&self, node: Node<'_>) -> Option<UsingDirective> {
        if children(node).iter().any(|c| c.kind() == "comment") {
            return None;
        }
        let text = normalize_whitespace(self.text(node));
        let body = text.trim_end_matches(';').trim();
        let (global, rest) = match body.strip_prefix("global ") {
            Some(rest) => (true, rest.trim_start()),
            None => (false, body),
        };
        let target = rest.strip_prefix("using")?.trim();
        Some(UsingDirective {
            global,
            target: target.to_string(),
        })
    }

    fn namespace_name(&self, node: Node<'_>) -> String {
        node.child_by_field_name("name")
            .map(|n| self.text(n).split_whitespace().collect())
            .unwrap_or_default()
    }

    fn block_namespace(&self, node: Node<'_>) -> NamespaceNode {
        let mut ns = NamespaceNode::new(self.namespace_name(node));
        if let Some(body) = children(node)
            .into_iter()
            .find(|c| c.kind() == "declaration_list")
        {
            let (members, trailing) = self.type_members(body);
            ns.members = members;
            ns.trailing = trailing;
        }
        ns
    }

    fn file_scoped_namespace(&self, node: Node<'_>) -> NamespaceNode {
        let mut ns = NamespaceNode::new(self.namespace_name(node));
        ns.style = NamespaceStyle::FileScoped;

        // Grammars that nest the following declarations under the namespace node
        let name = node.child_by_field_name("name").map(|n| n.id());
        let nested: Vec<Node<'_>> = named_children(node)
            .into_iter()
            .filter(|c| Some(c.id()) != name && c.kind() != "comment")
            .filter(|c| c.kind() != "attribute_list")
            .collect();
        if !nested.is_empty() {
            let sequence = self.sequence(&nested, Some(node.start_position().row));
            for entry in sequence.entries {
                ns.members.push(self.type_entry(entry));
            }
            ns.trailing = sequence.trailing;
        }
        ns
    }

    fn type_members(&self, body: Node<'_>) -> (Vec<TypeMember>, Trivia) {
        let nodes = named_children(body);
        let sequence = self.sequence(&nodes, Some(body.start_position().row));
        let members = sequence
            .entries
            .into_iter()
            .map(|entry| self.type_entry(entry))
            .collect();
        (members, sequence.trailing)
    }

    fn type_entry(&self, entry: Entry<'_>) -> TypeMember {
        match entry {
            Entry::Node { trivia, node } => self.type_member(trivia, node),
            Entry::Comments { blank_line, source } => TypeMember {
                trivia: spacing(blank_line),
                kind: TypeMemberKind::Other(OpaqueNode::comment(source)),
            },
        }
    }

    fn type_member(&self, mut trivia: Trivia, node: Node<'_>) -> TypeMember {
        let kind = if node.kind() == "class_declaration" {
            match self.class_declaration(node) {
                Some(class) => {
                    trivia.comments.extend(self.hoisted_comments(node));
                    TypeMemberKind::Class(class)
                }
                None => {
                    debug!(
                        class = %self.opaque(node).name.unwrap_or_default(),
                        "Keeping class with unsupported syntax as text"
                    );
                    TypeMemberKind::Other(self.opaque(node))
                }
            }
        } else {
            TypeMemberKind::Other(self.opaque(node))
        };
        TypeMember { trivia, kind }
    }

    fn class_declaration(&self, node: Node<'_>) -> Option<ClassNode> {
        let name = node.child_by_field_name("name")?;
        let mut class = ClassNode::new(self.text(name));
        let mut body = None;

        for child in children(node) {
            if child.id() == name.id() {
                continue;
            }
            match child.kind() {
                "attribute_list" => class.attributes.push(self.verbatim(child)),
                "modifier" => class.modifiers.push(self.text(child).to_string()),
                "type_parameter_list" => {
                    class.type_parameters = Some(normalize_whitespace(self.text(child)))
                }
                "parameter_list" => class.parameters = Some(normalize_whitespace(self.text(child))),
                "base_list" => {
                    class.base_types = named_children(child)
                        .into_iter()
                        .filter(|c| c.kind() != "comment")
                        .map(|c| normalize_whitespace(self.text(c)))
                        .collect();
                }
                "type_parameter_constraints_clause" => class
                    .constraints
                    .push(normalize_whitespace(self.text(child))),
                "declaration_list" => body = Some(child),
                "class" | ";" | "comment" => {}
                kind if !child.is_named() && MODIFIER_KEYWORDS.contains(&kind) => {
                    class.modifiers.push(kind.to_string())
                }
                _ => return None,
            }
        }

        let body = body?;
        let nodes = named_children(body);
        let sequence = self.sequence(&nodes, Some(body.start_position().row));
        class.members = sequence
            .entries
            .into_iter()
            .map(|entry| match entry {
                Entry::Node { trivia, node } => self.member(trivia, node),
                Entry::Comments { blank_line, source } => MemberNode {
                    trivia: spacing(blank_line),
                    kind: MemberKind::Comment,
                    name: None,
                    body: MemberBody::Parsed {
                        source,
                        method: None,
                    },
                },
            })
            .collect();
        class.trailing = sequence.trailing;
        Some(class)
    }

    fn member(&self, trivia: Trivia, node: Node<'_>) -> MemberNode {
        let kind = match node.kind() {
            "method_declaration" => MemberKind::Method,
            "constructor_declaration" | "destructor_declaration" => MemberKind::Constructor,
            "property_declaration" | "indexer_declaration" => MemberKind::Property,
            "field_declaration" => MemberKind::Field,
            "event_declaration" | "event_field_declaration" => MemberKind::Event,
            "class_declaration"
            | "struct_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "record_struct_declaration"
            | "delegate_declaration" => MemberKind::Type,
            _ => MemberKind::Other,
        };

        let method = if kind == MemberKind::Method {
            self.method_declaration(node)
        } else {
            None
        };
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .or_else(|| method.as_ref().map(|m| m.name.clone()));

        MemberNode {
            trivia,
            kind,
            name,
            body: MemberBody::Parsed {
                source: self.verbatim(node),
                method,
            },
        }
    }

    /// Structural view of a method, or `None` when it uses syntax outside the
    /// modeled subset
    fn method_declaration(&self, node: Node<'_>) -> Option<MethodDecl> {
        let name = node.child_by_field_name("name")?;
        let returns = node
            .child_by_field_name("returns")
            .or_else(|| node.child_by_field_name("type"))?;

        let mut decl = MethodDecl::new(
            &[],
            normalize_whitespace(self.text(returns)),
            self.text(name),
            MethodBody::Declaration,
        );
        let mut body = None;

        for child in children(node) {
            if child.id() == name.id() || child.id() == returns.id() {
                continue;
            }
            match child.kind() {
                "attribute_list" => decl.attributes.push(self.verbatim(child)),
                "modifier" => decl.modifiers.push(self.text(child).to_string()),
                "type_parameter_list" => {
                    decl.type_parameters = Some(normalize_whitespace(self.text(child)))
                }
                "parameter_list" => {
                    for parameter in named_children(child) {
                        if parameter.kind() != "parameter" {
                            return None;
                        }
                        decl.parameters
                            .push(normalize_whitespace(self.text(parameter)));
                    }
                }
                "type_parameter_constraints_clause" => decl
                    .constraints
                    .push(normalize_whitespace(self.text(child))),
                "block" => body = Some(MethodBody::Block(self.block(child))),
                "arrow_expression_clause" => {
                    let inner = named_children(child);
                    match inner.as_slice() {
                        [expression] if expression.kind() != "comment" => {
                            body = Some(MethodBody::Expression(self.expression(*expression)))
                        }
                        _ => return None,
                    }
                }
                ";" => {}
                kind if !child.is_named() && MODIFIER_KEYWORDS.contains(&kind) => {
                    decl.modifiers.push(kind.to_string())
                }
                _ => return None,
            }
        }

        decl.body = body.unwrap_or(MethodBody::Declaration);
        Some(decl)
    }

    fn block(&self, node: Node<'_>) -> Block {
        let nodes = named_children(node);
        let sequence = self.sequence(&nodes, Some(node.start_position().row));
        let statements = sequence
            .entries
            .into_iter()
            .map(|entry| match entry {
                Entry::Node { trivia, node } => Statement {
                    trivia,
                    kind: self.statement(node),
                },
                Entry::Comments { blank_line, source } => Statement {
                    trivia: spacing(blank_line),
                    kind: StatementKind::Other(source),
                },
            })
            .collect();
        Block {
            statements,
            trailing: sequence.trailing,
        }
    }

    fn statement(&self, node: Node<'_>) -> StatementKind {
        let inner = named_children(node);
        match (node.kind(), inner.as_slice()) {
            ("expression_statement", [expression]) if expression.kind() != "comment" => {
                StatementKind::Expression(self.expression(*expression))
            }
            ("return_statement", []) => StatementKind::Return(None),
            ("return_statement", [expression]) if expression.kind() != "comment" => {
                StatementKind::Return(Some(self.expression(*expression)))
            }
            _ => StatementKind::Other(self.verbatim(node)),
        }
    }

    fn expression(&self, node: Node<'_>) -> Expression {
        self.structured_expression(node)
            .unwrap_or_else(|| Expression::Other(self.verbatim(node)))
    }

    fn structured_expression(&self, node: Node<'_>) -> Option<Expression> {
        let parts = children(node);
        if parts.iter().any(|c| c.kind() == "comment") {
            return None;
        }

        let expression = match node.kind() {
            "identifier" => Expression::Identifier(self.text(node).to_string()),
            "member_access_expression" => {
                let target = node.child_by_field_name("expression")?;
                let member = node.child_by_field_name("name")?;
                if member.kind() != "identifier" || !parts.iter().any(|c| c.kind() == ".") {
                    return None;
                }
                Expression::MemberAccess {
                    target: Box::new(self.expression(target)),
                    member: self.text(member).to_string(),
                }
            }
            "invocation_expression" => {
                let function = node.child_by_field_name("function")?;
                let arguments = node.child_by_field_name("arguments")?;
                let mut values = Vec::new();
                for argument in named_children(arguments) {
                    let inner = named_children(argument);
                    match (argument.kind(), inner.as_slice()) {
                        ("argument", [value])
                            if self.text(argument) == self.text(*value) =>
                        {
                            values.push(self.expression(*value))
                        }
                        _ => return None,
                    }
                }
                Expression::call(self.expression(function), values)
            }
            "assignment_expression" => {
                let is_simple = parts.iter().any(|c| {
                    c.kind() == "=" || (c.kind() == "assignment_operator" && self.text(*c) == "=")
                });
                if !is_simple {
                    return None;
                }
                let left = node.child_by_field_name("left")?;
                let right = node.child_by_field_name("right")?;
                Expression::assign(self.expression(left), self.expression(right))
            }
            kind => Expression::Literal(Literal {
                kind: literal_kind(kind)?,
                token: self.text(node).to_string(),
            }),
        };
        Some(expression)
    }
}

fn literal_kind(kind: &str) -> Option<LiteralKind> {
    Some(match kind {
        "string_literal" => LiteralKind::String,
        "character_literal" => LiteralKind::Character,
        "integer_literal" => LiteralKind::Integer,
        "real_literal" => LiteralKind::Real,
        "boolean_literal" => LiteralKind::Boolean,
        "null_literal" => LiteralKind::Null,
        _ => return None,
    })
}

fn spacing(blank_line: bool) -> Trivia {
    Trivia {
        blank_line,
        comments: Vec::new(),
    }
}
