//! Canonical C# formatting
//!
//! Layout rules:
//! - Allman braces, one indentation level per nesting depth
//! - a blank line between the using group and what follows it, around
//!   namespaces and type declarations, and around methods
//! - other blank lines only where the source had one
//! - `\n` line endings and exactly one trailing newline
//!
//! Verbatim members are re-indented as blocks, so printing the parse of
//! printed output yields the same text.

use crate::syntax::{
    ClassNode, Expression, MemberBody, MemberKind, MemberNode, MethodBody, MethodDecl,
    NamespaceNode, NamespaceStyle, SourceTree, Statement, StatementKind, TopLevelKind, TypeMember,
    TypeMemberKind,
};
use crate::verbatim::Trivia;

/// Line buffer that never emits leading or doubled blank lines
#[derive(Default)]
struct Output {
    lines: Vec<String>,
}

impl Output {
    /// Append `text` after `pad`. Multi-line text is stored line by line so
    /// blank-line checks see its last line.
    fn line(&mut self, pad: &str, text: &str) {
        let mut rest = text.split('\n');
        if let Some(first) = rest.next() {
            self.lines.push(format!("{}{}", pad, first));
        }
        self.lines.extend(rest.map(str::to_string));
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn finish(self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// Renders a [`SourceTree`] with the canonical layout
#[derive(Debug, Clone)]
pub struct Printer {
    indent_width: usize,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Printer {
    pub fn new(indent_width: usize) -> Self {
        Self { indent_width }
    }

    pub fn print(&self, tree: &SourceTree) -> String {
        let mut out = Output::default();

        for comment in &tree.header {
            out.line("", &comment.render(""));
        }
        if !tree.header.is_empty() {
            out.blank();
        }

        let mut previous: Option<&TopLevelKind> = None;
        for item in &tree.items {
            if let Some(prev) = previous {
                if item.trivia.blank_line || top_level_separated(prev, &item.kind) {
                    out.blank();
                }
            }
            self.comments(&mut out, &item.trivia, "");
            match &item.kind {
                TopLevelKind::Using(using) => {
                    let global = if using.global { "global " } else { "" };
                    out.line("", &format!("{}using {};", global, using.target));
                }
                TopLevelKind::Namespace(ns) => self.namespace(&mut out, ns, 0),
                TopLevelKind::Other(node) => out.line("", &node.source.render("")),
            }
            previous = Some(&item.kind);
        }

        self.trailing(&mut out, &tree.trailing, "", !tree.items.is_empty());
        out.finish()
    }

    fn pad(&self, depth: usize) -> String {
        " ".repeat(depth * self.indent_width)
    }

    fn comments(&self, out: &mut Output, trivia: &Trivia, pad: &str) {
        for comment in &trivia.comments {
            out.line(pad, &comment.render(pad));
        }
    }

    fn trailing(&self, out: &mut Output, trivia: &Trivia, pad: &str, after_content: bool) {
        if trivia.comments.is_empty() {
            return;
        }
        if after_content && trivia.blank_line {
            out.blank();
        }
        self.comments(out, trivia, pad);
    }

    fn namespace(&self, out: &mut Output, ns: &NamespaceNode, depth: usize) {
        let pad = self.pad(depth);
        match ns.style {
            NamespaceStyle::Block => {
                out.line(&pad, &format!("namespace {}", ns.name));
                out.line(&pad, "{");
                self.type_members(out, &ns.members, &ns.trailing, depth + 1);
                out.line(&pad, "}");
            }
            NamespaceStyle::FileScoped => {
                out.line(&pad, &format!("namespace {};", ns.name));
                if !ns.members.is_empty() {
                    out.blank();
                }
                self.type_members(out, &ns.members, &ns.trailing, depth);
            }
        }
    }

    fn type_members(&self, out: &mut Output, members: &[TypeMember], trailing: &Trivia, depth: usize) {
        let pad = self.pad(depth);
        let mut previous: Option<&TypeMemberKind> = None;
        for member in members {
            if let Some(prev) = previous {
                if member.trivia.blank_line || is_declaration(prev) || is_declaration(&member.kind) {
                    out.blank();
                }
            }
            self.comments(out, &member.trivia, &pad);
            match &member.kind {
                TypeMemberKind::Class(class) => self.class(out, class, depth),
                TypeMemberKind::Other(node) => out.line(&pad, &node.source.render(&pad)),
            }
            previous = Some(&member.kind);
        }
        self.trailing(out, trailing, &pad, !members.is_empty());
    }

    fn class(&self, out: &mut Output, class: &ClassNode, depth: usize) {
        let pad = self.pad(depth);
        for attribute in &class.attributes {
            out.line(&pad, &attribute.render(&pad));
        }

        let mut header = String::new();
        for modifier in &class.modifiers {
            header.push_str(modifier);
            header.push(' ');
        }
        header.push_str("class ");
        header.push_str(&class.identifier);
        if let Some(type_parameters) = &class.type_parameters {
            header.push_str(type_parameters);
        }
        if let Some(parameters) = &class.parameters {
            header.push_str(parameters);
        }
        if !class.base_types.is_empty() {
            header.push_str(" : ");
            header.push_str(&class.base_types.join(", "));
        }
        out.line(&pad, &header);

        let inner = self.pad(depth + 1);
        for constraint in &class.constraints {
            out.line(&inner, constraint);
        }

        out.line(&pad, "{");
        let mut previous: Option<MemberKind> = None;
        for member in &class.members {
            if let Some(prev) = previous {
                if member.trivia.blank_line || is_spaced(prev) || is_spaced(member.kind) {
                    out.blank();
                }
            }
            self.member(out, member, depth + 1);
            previous = Some(member.kind);
        }
        self.trailing(out, &class.trailing, &inner, !class.members.is_empty());
        out.line(&pad, "}");
    }

    fn member(&self, out: &mut Output, member: &MemberNode, depth: usize) {
        let pad = self.pad(depth);
        self.comments(out, &member.trivia, &pad);
        match &member.body {
            MemberBody::Parsed { source, .. } => out.line(&pad, &source.render(&pad)),
            MemberBody::Synthesized(decl) => self.method(out, decl, depth),
        }
    }

    fn method(&self, out: &mut Output, decl: &MethodDecl, depth: usize) {
        let pad = self.pad(depth);
        for attribute in &decl.attributes {
            out.line(&pad, &attribute.render(&pad));
        }

        let mut signature = String::new();
        for modifier in &decl.modifiers {
            signature.push_str(modifier);
            signature.push(' ');
        }
        signature.push_str(&decl.return_type);
        signature.push(' ');
        signature.push_str(&decl.name);
        if let Some(type_parameters) = &decl.type_parameters {
            signature.push_str(type_parameters);
        }
        signature.push('(');
        signature.push_str(&decl.parameters.join(", "));
        signature.push(')');

        let inner = self.pad(depth + 1);
        match &decl.body {
            MethodBody::Block(block) => {
                out.line(&pad, &signature);
                for constraint in &decl.constraints {
                    out.line(&inner, constraint);
                }
                out.line(&pad, "{");
                self.statements(out, &block.statements, &inner);
                self.trailing(out, &block.trailing, &inner, !block.statements.is_empty());
                out.line(&pad, "}");
            }
            MethodBody::Expression(expression) => {
                out.line(&pad, &signature);
                for constraint in &decl.constraints {
                    out.line(&inner, constraint);
                }
                out.line(&inner, &format!("=> {};", self.expression(expression, &inner)));
            }
            MethodBody::Declaration => {
                if decl.constraints.is_empty() {
                    out.line(&pad, &format!("{};", signature));
                } else {
                    out.line(&pad, &signature);
                    let last = decl.constraints.len() - 1;
                    for (index, constraint) in decl.constraints.iter().enumerate() {
                        let end = if index == last { ";" } else { "" };
                        out.line(&inner, &format!("{}{}", constraint, end));
                    }
                }
            }
        }
    }

    fn statements(&self, out: &mut Output, statements: &[Statement], pad: &str) {
        for (index, statement) in statements.iter().enumerate() {
            if index > 0 && statement.trivia.blank_line {
                out.blank();
            }
            self.comments(out, &statement.trivia, pad);
            let text = match &statement.kind {
                StatementKind::Expression(expression) => {
                    format!("{};", self.expression(expression, pad))
                }
                StatementKind::Return(None) => "return;".to_string(),
                StatementKind::Return(Some(value)) => {
                    format!("return {};", self.expression(value, pad))
                }
                StatementKind::Other(source) => source.render(pad),
            };
            out.line(pad, &text);
        }
    }

    fn expression(&self, expression: &Expression, pad: &str) -> String {
        match expression {
            Expression::Identifier(name) => name.clone(),
            Expression::MemberAccess { target, member } => {
                format!("{}.{}", self.expression(target, pad), member)
            }
            Expression::Invocation { callee, arguments } => {
                let arguments: Vec<String> = arguments
                    .iter()
                    .map(|a| self.expression(a, pad))
                    .collect();
                format!("{}({})", self.expression(callee, pad), arguments.join(", "))
            }
            Expression::Assignment { target, value } => format!(
                "{} = {}",
                self.expression(target, pad),
                self.expression(value, pad)
            ),
            Expression::Literal(literal) => literal.token.clone(),
            Expression::Other(source) => source.render(pad),
        }
    }
}

fn top_level_separated(previous: &TopLevelKind, current: &TopLevelKind) -> bool {
    let is_using = |kind: &TopLevelKind| matches!(kind, TopLevelKind::Using(_));
    matches!(previous, TopLevelKind::Namespace(_))
        || matches!(current, TopLevelKind::Namespace(_))
        || is_using(previous) != is_using(current)
}

fn is_declaration(kind: &TypeMemberKind) -> bool {
    match kind {
        TypeMemberKind::Class(_) => true,
        TypeMemberKind::Other(node) => node.kind.ends_with("_declaration"),
    }
}

fn is_spaced(kind: MemberKind) -> bool {
    matches!(
        kind,
        MemberKind::Method | MemberKind::Constructor | MemberKind::Type
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::syntax::{Block, Literal, TopLevelItem, UsingDirective};
    use pretty_assertions::assert_eq;

    fn reprint(source: &str) -> String {
        Printer::default().print(&parse_source(source).unwrap())
    }

    #[test]
    fn test_canonical_layout() {
        let source = "using Terraria;\nnamespace TerraDota.Items {\n  public class Sword : ModItem {\n    public override void AddRecipes() {\n    }\n    public override void SetDefaults()\n    {\n      Item.damage = 5;\n    }\n  }\n}";
        let expected = "using Terraria;\n\nnamespace TerraDota.Items\n{\n    public class Sword : ModItem\n    {\n        public override void AddRecipes() {\n        }\n\n        public override void SetDefaults()\n        {\n          Item.damage = 5;\n        }\n    }\n}\n";

        assert_eq!(reprint(source), expected);
    }

    #[test]
    fn test_printing_is_idempotent() {
        let source = r#"// banner


using System;
using Terraria;
namespace A.B
{

    /// <summary>Doc</summary>
    [Serializable]
    public sealed class C : ModItem, IDisposable
    {
        private int x;   // trailing note
        private int y;



        public void Dispose()
        {
            var text = @"line one
    line two";
            x = 1;
        }
        // dangling
    }
}
// end of file
"#;
        let once = reprint(source);
        let twice = reprint(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_synthesized_method_layout() {
        let mut tree = parse_source("namespace A\n{\n    class B\n    {\n    }\n}\n").unwrap();
        let decl = MethodDecl::new(
            &["public", "override"],
            "void",
            "SetStaticDefaults",
            MethodBody::Block(Block::new(vec![Statement::expression(Expression::call(
                Expression::path("Tooltip.SetDefault"),
                vec![Expression::Literal(Literal::string(""))],
            ))])),
        );
        if let TopLevelKind::Namespace(ns) = &mut tree.items[0].kind {
            if let TypeMemberKind::Class(class) = &mut ns.members[0].kind {
                class.members.push(MemberNode::method(decl));
            }
        }

        let expected = "namespace A\n{\n    class B\n    {\n        public override void SetStaticDefaults()\n        {\n            Tooltip.SetDefault(\"\");\n        }\n    }\n}\n";
        assert_eq!(Printer::new(4).print(&tree), expected);
    }

    #[test]
    fn test_indent_width_is_configurable() {
        let tree = parse_source("namespace A\n{\n    class B\n    {\n    }\n}\n").unwrap();
        assert_eq!(
            Printer::new(2).print(&tree),
            "namespace A\n{\n  class B\n  {\n  }\n}\n"
        );
    }

    #[test]
    fn test_usings_group_then_blank_line() {
        let tree = SourceTree {
            header: vec![crate::verbatim::Verbatim::from_text("/* banner */")],
            items: vec![
                TopLevelItem {
                    trivia: Trivia::none(),
                    kind: TopLevelKind::Using(UsingDirective::new("Terraria")),
                },
                TopLevelItem {
                    trivia: Trivia::none(),
                    kind: TopLevelKind::Using(UsingDirective::new("Terraria.ID")),
                },
                TopLevelItem {
                    trivia: Trivia::none(),
                    kind: TopLevelKind::Namespace(NamespaceNode::new("A")),
                },
            ],
            trailing: Trivia::none(),
        };

        assert_eq!(
            Printer::default().print(&tree),
            "/* banner */\n\nusing Terraria;\nusing Terraria.ID;\n\nnamespace A\n{\n}\n"
        );
    }

    #[test]
    fn test_empty_tree_prints_nothing() {
        assert_eq!(Printer::default().print(&SourceTree::default()), "");
    }
}
