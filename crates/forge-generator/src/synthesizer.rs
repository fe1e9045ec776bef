//! Canonical member synthesis
//!
//! Builds the generator-owned methods from descriptor data. Synthesis is
//! pure: the same descriptor always yields structurally identical members.

use crate::descriptor::Descriptor;
use crate::merger::{ManagedMember, MergePolicy};
use forge_config::{GeneratorConfig, MemberSignature, PropertyRule, ValueKind};
use forge_foundation::{ForgeError, ForgeResult};
use forge_lang_csharp::{
    Block, Expression, Literal, MemberNode, MethodBody, MethodDecl, Statement,
};
use serde_json::Value;

const MODIFIERS: &[&str] = &["public", "override"];

pub struct Synthesizer<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> Synthesizer<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// The full set of managed members for `descriptor`, in dispatch order
    pub fn plan(&self, descriptor: &Descriptor) -> ForgeResult<Vec<ManagedMember>> {
        Ok(vec![
            ManagedMember::new(
                MergePolicy::Replace,
                self.static_defaults(&descriptor.description),
            ),
            ManagedMember::new(MergePolicy::Replace, self.defaults(descriptor)?),
            ManagedMember::new(MergePolicy::EnsurePresent, self.recipes()),
            ManagedMember::new(MergePolicy::EnsurePresent, self.use_item()),
        ])
    }

    /// Registers `description` as the tooltip
    pub fn static_defaults(&self, description: &str) -> MemberNode {
        let call = Expression::call(
            Expression::path(&self.config.tooltip_entry_point),
            vec![Expression::Literal(Literal::string(description))],
        );
        self.method(
            &self.config.members.static_defaults,
            vec![Statement::expression(call)],
        )
    }

    /// One assignment per recognised default field, in property-table order
    pub fn defaults(&self, descriptor: &Descriptor) -> ForgeResult<MemberNode> {
        let mut statements = Vec::new();
        for rule in &self.config.properties {
            let value = match descriptor.defaults.get(&rule.field) {
                None | Some(Value::Null) => continue,
                Some(value) => value,
            };
            let literal = literal_for(rule, value).ok_or_else(|| {
                ForgeError::descriptor(
                    &descriptor.source,
                    format!(
                        "default.{} must be {}, found {}",
                        rule.field,
                        kind_name(rule.kind),
                        value
                    ),
                )
            })?;
            statements.push(Statement::expression(Expression::assign(
                Expression::path(&rule.target),
                Expression::Literal(literal),
            )));
        }
        Ok(self.method(&self.config.members.defaults, statements))
    }

    /// The defaults member with no assignments, as placed in a new skeleton
    pub fn empty_defaults(&self) -> MemberNode {
        self.method(&self.config.members.defaults, Vec::new())
    }

    pub fn recipes(&self) -> MemberNode {
        self.method(&self.config.members.recipes, Vec::new())
    }

    /// Use handler that always reports success
    pub fn use_item(&self) -> MemberNode {
        self.method(
            &self.config.members.use_item,
            vec![Statement::returns(Some(Expression::Literal(
                Literal::boolean(true),
            )))],
        )
    }

    fn method(&self, signature: &MemberSignature, statements: Vec<Statement>) -> MemberNode {
        MemberNode::method(self.decl(signature, statements))
    }

    fn decl(&self, signature: &MemberSignature, statements: Vec<Statement>) -> MethodDecl {
        MethodDecl::new(
            MODIFIERS,
            signature.return_type.as_str(),
            signature.name.as_str(),
            MethodBody::Block(Block::new(statements)),
        )
    }
}

fn literal_for(rule: &PropertyRule, value: &Value) -> Option<Literal> {
    match rule.kind {
        ValueKind::Integer => value.as_i64().map(Literal::integer),
        ValueKind::Float => value
            .as_f64()
            .filter(|v| v.is_finite())
            .map(Literal::float),
        ValueKind::Boolean => value.as_bool().map(Literal::boolean),
        ValueKind::String => value.as_str().map(Literal::string),
    }
}

fn kind_name(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Integer => "an integer",
        ValueKind::Float => "a number",
        ValueKind::Boolean => "a boolean",
        ValueKind::String => "a string",
    }
}
