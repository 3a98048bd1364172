//! Association declaration directives.
//!
//! Directives form a closed set. Shorthands (`has_many`, `has_one`,
//! `belongs_to`) are sugar: every directive canonicalizes into exactly one
//! [`AssociationDefinition`] when the declaration block ends.
//!
//! ```
//! use relmap_core::association::{AssociationDsl, AssociationKind};
//!
//! let mut dsl = AssociationDsl::new("posts");
//! dsl.has_many("comments");
//! dsl.belongs_to("user").alias("author");
//! dsl.one_to_many("tags").through("posts_tags");
//!
//! let definitions = dsl.finish();
//! assert_eq!(definitions[2].kind, AssociationKind::ManyToMany);
//! ```

use super::definition::{AssociationDefinition, AssociationKind};
use crate::naming;
use tracing::trace;

/// Directive name as written in a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// `one_to_many(target, through:, as:)`
    OneToMany,
    /// `many_to_one(target, as:)`
    ManyToOne,
    /// `one_to_one(target, through:, as:)`
    OneToOne,
    /// `many_to_many(target, through:, as:)`
    ManyToMany,
    /// `has_many(target)` - sugar for `one_to_many`.
    HasMany,
    /// `has_one(target, as:)` - sugar for `one_to_one` on the pluralized target.
    HasOne,
    /// `belongs_to(target, as:)` - sugar for `many_to_one` on the pluralized target.
    BelongsTo,
}

/// One raw directive with its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive name.
    pub kind: DirectiveKind,
    /// Target as written.
    pub target: String,
    /// `through:` option.
    pub through: Option<String>,
    /// `as:` option.
    pub alias: Option<String>,
    /// Explicit target relation, overriding the one derived from `target`.
    pub relation: Option<String>,
}

impl Directive {
    /// Create a directive without options.
    pub fn new(kind: DirectiveKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            through: None,
            alias: None,
            relation: None,
        }
    }

    /// Target relation implied by the written target.
    fn default_relation(&self) -> String {
        match self.kind {
            DirectiveKind::HasOne | DirectiveKind::BelongsTo => naming::pluralize(&self.target),
            _ => self.target.clone(),
        }
    }

    /// Reduce the directive to its canonical definition.
    pub fn canonicalize(&self, source: &str) -> AssociationDefinition {
        let kind = match (self.kind, self.through.is_some()) {
            (DirectiveKind::ManyToOne | DirectiveKind::BelongsTo, _) => AssociationKind::ManyToOne,
            (DirectiveKind::ManyToMany, _) => AssociationKind::ManyToMany,
            (DirectiveKind::OneToMany | DirectiveKind::HasMany, false) => AssociationKind::OneToMany,
            (DirectiveKind::OneToMany | DirectiveKind::HasMany, true) => AssociationKind::ManyToMany,
            (DirectiveKind::OneToOne | DirectiveKind::HasOne, false) => AssociationKind::OneToOne,
            (DirectiveKind::OneToOne | DirectiveKind::HasOne, true) => {
                AssociationKind::OneToOneThrough
            }
        };

        let target = self
            .relation
            .clone()
            .unwrap_or_else(|| self.default_relation());

        let through = match kind {
            AssociationKind::ManyToMany => Some(
                self.through
                    .clone()
                    .unwrap_or_else(|| format!("{}_{}", source, target)),
            ),
            AssociationKind::OneToOneThrough => self.through.clone(),
            _ => None,
        };

        // An explicit relation keeps the written target as the association name.
        let alias = self
            .alias
            .clone()
            .or_else(|| self.relation.as_ref().map(|_| self.target.clone()));

        AssociationDefinition {
            kind,
            source: source.to_string(),
            target,
            through,
            alias,
        }
    }
}

/// Options accepted by `many_to_one` and `belongs_to`.
pub struct AssociationOptions<'a> {
    directive: &'a mut Directive,
}

impl AssociationOptions<'_> {
    /// Rename the association (`as:`).
    pub fn alias(self, alias: impl Into<String>) -> Self {
        self.directive.alias = Some(alias.into());
        self
    }

    /// Target an explicit relation instead of the one derived from the name.
    pub fn relation(self, relation: impl Into<String>) -> Self {
        self.directive.relation = Some(relation.into());
        self
    }
}

/// Options accepted by directives that may join through another relation.
pub struct ThroughOptions<'a> {
    directive: &'a mut Directive,
}

impl ThroughOptions<'_> {
    /// Join through an intermediate relation (`through:`).
    pub fn through(self, through: impl Into<String>) -> Self {
        self.directive.through = Some(through.into());
        self
    }

    /// Rename the association (`as:`).
    pub fn alias(self, alias: impl Into<String>) -> Self {
        self.directive.alias = Some(alias.into());
        self
    }

    /// Target an explicit relation instead of the one derived from the name.
    pub fn relation(self, relation: impl Into<String>) -> Self {
        self.directive.relation = Some(relation.into());
        self
    }
}

/// Accumulates the directives of one relation's `associations` block.
#[derive(Debug, Clone)]
pub struct AssociationDsl {
    source: String,
    directives: Vec<Directive>,
}

impl AssociationDsl {
    /// Start a block for the `source` relation.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            directives: Vec::new(),
        }
    }

    fn push(&mut self, kind: DirectiveKind, target: impl Into<String>) -> &mut Directive {
        self.directives.push(Directive::new(kind, target));
        let last = self.directives.len() - 1;
        &mut self.directives[last]
    }

    /// Declare a one-to-many association (many-to-many with `through`).
    pub fn one_to_many(&mut self, target: impl Into<String>) -> ThroughOptions<'_> {
        ThroughOptions {
            directive: self.push(DirectiveKind::OneToMany, target),
        }
    }

    /// Declare a many-to-one association.
    pub fn many_to_one(&mut self, target: impl Into<String>) -> AssociationOptions<'_> {
        AssociationOptions {
            directive: self.push(DirectiveKind::ManyToOne, target),
        }
    }

    /// Declare a one-to-one association (one-to-one-through with `through`).
    pub fn one_to_one(&mut self, target: impl Into<String>) -> ThroughOptions<'_> {
        ThroughOptions {
            directive: self.push(DirectiveKind::OneToOne, target),
        }
    }

    /// Declare a many-to-many association. Without `through`, the join
    /// relation defaults to `<source>_<target>`.
    pub fn many_to_many(&mut self, target: impl Into<String>) -> ThroughOptions<'_> {
        ThroughOptions {
            directive: self.push(DirectiveKind::ManyToMany, target),
        }
    }

    /// `has many T`.
    pub fn has_many(&mut self, target: impl Into<String>) -> ThroughOptions<'_> {
        ThroughOptions {
            directive: self.push(DirectiveKind::HasMany, target),
        }
    }

    /// `has one T`; the target relation is the plural of `T`.
    pub fn has_one(&mut self, target: impl Into<String>) -> ThroughOptions<'_> {
        ThroughOptions {
            directive: self.push(DirectiveKind::HasOne, target),
        }
    }

    /// `belongs to T`; the target relation is the plural of `T`.
    pub fn belongs_to(&mut self, target: impl Into<String>) -> AssociationOptions<'_> {
        AssociationOptions {
            directive: self.push(DirectiveKind::BelongsTo, target),
        }
    }

    /// Relation declaring the block.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Raw directives in declaration order.
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// End the block, canonicalizing every directive in declaration order.
    pub fn finish(self) -> Vec<AssociationDefinition> {
        self.directives
            .iter()
            .map(|directive| {
                let definition = directive.canonicalize(&self.source);
                trace!(
                    source = %self.source,
                    directive = ?directive.kind,
                    kind = %definition.kind,
                    target = %definition.target,
                    "Canonicalized association directive"
                );
                definition
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn single(f: impl FnOnce(&mut AssociationDsl)) -> AssociationDefinition {
        let mut dsl = AssociationDsl::new("posts");
        f(&mut dsl);
        let mut definitions = dsl.finish();
        assert_eq!(definitions.len(), 1);
        definitions.remove(0)
    }

    #[test]
    fn test_has_many() {
        let def = single(|a| {
            a.has_many("tags");
        });

        assert_eq!(
            def,
            AssociationDefinition::new(AssociationKind::OneToMany, "posts", "tags")
        );
    }

    #[test]
    fn test_has_many_equals_one_to_many() {
        let sugar = single(|a| {
            a.has_many("comments");
        });
        let canonical = single(|a| {
            a.one_to_many("comments");
        });

        assert_eq!(sugar, canonical);
    }

    #[test]
    fn test_one_to_many_through_is_many_to_many() {
        let def = single(|a| {
            a.one_to_many("tags").through("posts_tags");
        });

        assert_eq!(
            def,
            AssociationDefinition::new(AssociationKind::ManyToMany, "posts", "tags")
                .with_through("posts_tags")
        );
    }

    #[test]
    fn test_many_to_many_default_join_relation() {
        let def = single(|a| {
            a.many_to_many("tags");
        });

        assert_eq!(def.kind, AssociationKind::ManyToMany);
        assert_eq!(def.through.as_deref(), Some("posts_tags"));
    }

    #[test]
    fn test_belongs_to_pluralizes() {
        let def = single(|a| {
            a.belongs_to("user");
        });

        assert_eq!(
            def,
            AssociationDefinition::new(AssociationKind::ManyToOne, "posts", "users")
        );
        assert_eq!(def.name(), "user");
    }

    #[test]
    fn test_belongs_to_with_alias() {
        let def = single(|a| {
            a.belongs_to("user").alias("author");
        });

        assert_eq!(def.target, "users");
        assert_eq!(def.name(), "author");
        assert!(def.is_aliased());
    }

    #[test]
    fn test_has_one_pluralizes() {
        let def = single(|a| {
            a.has_one("account");
        });

        assert_eq!(
            def,
            AssociationDefinition::new(AssociationKind::OneToOne, "posts", "accounts")
        );
        assert_eq!(def.name(), "account");
    }

    #[test]
    fn test_has_one_with_alias() {
        let def = single(|a| {
            a.has_one("accounts").alias("user_account");
        });

        assert_eq!(def.kind, AssociationKind::OneToOne);
        assert_eq!(def.target, "accounts");
        assert_eq!(def.name(), "user_account");
        assert!(def.is_aliased());
    }

    #[test]
    fn test_one_to_one_through() {
        let def = single(|a| {
            a.one_to_one("covers").through("post_covers");
        });

        assert_eq!(
            def,
            AssociationDefinition::new(AssociationKind::OneToOneThrough, "posts", "covers")
                .with_through("post_covers")
        );
    }

    #[test]
    fn test_explicit_relation_keeps_written_name() {
        let def = single(|a| {
            a.belongs_to("editor").relation("users");
        });

        assert_eq!(def.target, "users");
        assert_eq!(def.alias.as_deref(), Some("editor"));
        assert_eq!(def.name(), "editor");
    }

    #[test]
    fn test_canonicalization_independent_of_order() {
        let mut first = AssociationDsl::new("posts");
        first.belongs_to("user");
        first.has_many("tags");

        let mut second = AssociationDsl::new("posts");
        second.has_many("tags");
        second.belongs_to("user");

        let first = first.finish();
        let second = second.finish();

        assert_eq!(first[1], second[0]);
        assert_eq!(first[0], second[1]);
    }

    #[test]
    fn test_directives_are_recorded() {
        let mut dsl = AssociationDsl::new("users");
        dsl.has_one("account").alias("primary_account");

        assert_eq!(dsl.source(), "users");
        assert_eq!(dsl.directives()[0].kind, DirectiveKind::HasOne);
        assert_eq!(
            dsl.directives()[0].alias.as_deref(),
            Some("primary_account")
        );
    }
}
