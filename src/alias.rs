use std::collections::HashMap;

use crate::parse::parse;
use crate::{AliasError, BuildError, Expr, MAX_DEPTH};

/// Named shorthands substituted into input expressions when an engine is built.
///
/// Each alias is parsed once. The table is never modified after construction.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, Expr>,
}

impl AliasTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw alias definitions such as `("is_dark", "sun=below_horizon | input_boolean.night")`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Expression`] naming the first alias that fails to parse.
    pub fn parse<'a>(
        definitions: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, BuildError> {
        let mut table = Self::new();
        for (name, raw) in definitions {
            let expr = parse(raw).map_err(|source| BuildError::Expression {
                origin: format!("for alias '{name}'"),
                source,
            })?;
            table.insert(name, expr);
        }
        Ok(table)
    }

    /// Register an already parsed alias, replacing any previous definition.
    pub fn insert(&mut self, name: &str, expr: Expr) {
        self.aliases.insert(name.to_owned(), expr);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.aliases.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Build a new tree with every alias reference replaced by its definition.
    ///
    /// A bare reference is replaced by the whole alias tree. A reference with
    /// an override (`alias=value`) is only allowed when the alias is a single
    /// entity, and yields that entity compared against `value`. Aliases may
    /// refer to other aliases.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::ValueOverride`] for an override on a compound
    /// alias, [`AliasError::Cyclic`] when aliases refer to each other in a loop
    /// and [`AliasError::TooDeep`] when the expanded tree exceeds [`MAX_DEPTH`].
    pub fn resolve(&self, expr: &Expr) -> Result<Expr, AliasError> {
        let mut expanding = Vec::new();
        self.resolve_inner(expr, &mut expanding, 1)
    }

    // `depth` is where the rebuilt node lands in the output tree.
    fn resolve_inner(
        &self,
        expr: &Expr,
        expanding: &mut Vec<String>,
        depth: usize,
    ) -> Result<Expr, AliasError> {
        if depth > MAX_DEPTH {
            return Err(AliasError::TooDeep { limit: MAX_DEPTH });
        }
        match expr {
            Expr::Entity { name, value } => {
                let Some(alias) = self.aliases.get(name) else {
                    return Ok(expr.clone());
                };

                if let Some(pos) = expanding.iter().position(|n| n == name) {
                    let mut path = expanding[pos..].to_vec();
                    path.push(name.clone());
                    return Err(AliasError::Cyclic { path });
                }

                expanding.push(name.clone());
                let resolved = self.resolve_inner(alias, expanding, depth);
                expanding.pop();

                match (value, resolved?) {
                    (None, resolved) => Ok(resolved),
                    (Some(value), Expr::Entity { name, .. }) => Ok(Expr::Entity {
                        name,
                        value: Some(value.clone()),
                    }),
                    (Some(value), _) => Err(AliasError::ValueOverride {
                        alias: name.clone(),
                        value: value.clone(),
                    }),
                }
            }
            Expr::Not(inner) => Ok(Expr::Not(Box::new(
                self.resolve_inner(inner, expanding, depth + 1)?,
            ))),
            Expr::Binary { op, left, right } => Ok(Expr::Binary {
                op: *op,
                left: Box::new(self.resolve_inner(left, expanding, depth + 1)?),
                right: Box::new(self.resolve_inner(right, expanding, depth + 1)?),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity;

    fn table(defs: &[(&str, &str)]) -> AliasTable {
        AliasTable::parse(defs.iter().copied()).unwrap()
    }

    fn resolve(table: &AliasTable, input: &str) -> Result<Expr, AliasError> {
        table.resolve(&parse(input).unwrap())
    }

    #[test]
    fn entity_alias_is_substituted() {
        let t = table(&[("switch", "binary_sensor.x")]);
        assert_eq!(resolve(&t, "switch").unwrap(), Expr::from(entity("binary_sensor.x")));
    }

    #[test]
    fn override_on_entity_alias() {
        let t = table(&[("switch", "binary_sensor.x")]);
        assert_eq!(
            resolve(&t, "switch=off").unwrap(),
            entity("binary_sensor.x").is("off")
        );
    }

    #[test]
    fn override_replaces_alias_value() {
        let t = table(&[("shut", "cover.blinds=closed")]);
        assert_eq!(resolve(&t, "shut").unwrap(), entity("cover.blinds").is("closed"));
        assert_eq!(
            resolve(&t, "shut=open").unwrap(),
            entity("cover.blinds").is("open")
        );
    }

    #[test]
    fn override_on_compound_alias_fails() {
        let t = table(&[("expr", "a | b")]);
        assert_eq!(
            resolve(&t, "expr=off"),
            Err(AliasError::ValueOverride {
                alias: "expr".into(),
                value: "off".into()
            })
        );
    }

    #[test]
    fn override_on_negated_alias_fails() {
        let t = table(&[("dark", "!sun.up")]);
        assert!(matches!(
            resolve(&t, "dark=on"),
            Err(AliasError::ValueOverride { .. })
        ));
    }

    #[test]
    fn compound_alias_inside_tree() {
        let t = table(&[("is_dark", "binary_sensor.dark | input_boolean.bedtime")]);
        let expr = resolve(&t, "binary_sensor.motion & is_dark").unwrap();
        let expected = parse("binary_sensor.motion & (binary_sensor.dark | input_boolean.bedtime)")
            .unwrap();
        assert_eq!(expr, expected);
    }

    #[test]
    fn negated_compound_alias() {
        let t = table(&[("expr", "a | b")]);
        assert_eq!(resolve(&t, "!expr").unwrap(), parse("!(a | b)").unwrap());
    }

    #[test]
    fn aliases_refer_to_aliases() {
        let t = table(&[("inner", "sensor.x"), ("outer", "inner & sensor.y")]);
        assert_eq!(
            resolve(&t, "outer").unwrap(),
            parse("sensor.x & sensor.y").unwrap()
        );
    }

    #[test]
    fn override_through_alias_chain() {
        let t = table(&[("inner", "sensor.x"), ("outer", "inner")]);
        assert_eq!(resolve(&t, "outer=off").unwrap(), entity("sensor.x").is("off"));
    }

    #[test]
    fn non_alias_passes_through() {
        let t = table(&[("switch", "binary_sensor.x")]);
        let input = parse("a & !b=off").unwrap();
        assert_eq!(t.resolve(&input).unwrap(), input);
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let t = table(&[("loop", "loop | a")]);
        assert_eq!(
            resolve(&t, "loop"),
            Err(AliasError::Cyclic {
                path: vec!["loop".into(), "loop".into()]
            })
        );
    }

    #[test]
    fn mutual_reference_is_a_cycle() {
        let t = table(&[("a", "b"), ("b", "c & a")]);
        match resolve(&t, "x | a") {
            Err(AliasError::Cyclic { path }) => {
                assert_eq!(path, ["a", "b", "a"]);
            }
            other => panic!("expected Cyclic, got {other:?}"),
        }
    }

    #[test]
    fn same_alias_twice_is_not_a_cycle() {
        let t = table(&[("m", "sensor.motion")]);
        assert_eq!(resolve(&t, "m & !m").unwrap(), parse("sensor.motion & !sensor.motion").unwrap());
    }

    #[test]
    fn alias_parse_error_names_alias() {
        let err = AliasTable::parse([("broken", "a &")]).unwrap_err();
        assert_eq!(err.to_string(), "invalid expression for alias 'broken': expression truncated");
    }

    fn chain(names: impl Iterator<Item = String>) -> String {
        names.collect::<Vec<_>>().join(" & ")
    }

    #[test]
    fn expansion_within_limit() {
        let deep = chain((0..200).map(|i| format!("d{i}")));
        let t = table(&[("deep", deep.as_str())]);
        let input = chain((0..10).map(|i| format!("s{i}")).chain(["deep".to_owned()]));
        let expr = resolve(&t, &input).unwrap();
        assert_eq!(expr.depth(), 210);
    }

    #[test]
    fn expansion_past_limit_fails() {
        let deep = chain((0..200).map(|i| format!("d{i}")));
        let t = table(&[("deep", deep.as_str())]);
        let input = chain((0..100).map(|i| format!("s{i}")).chain(["deep".to_owned()]));
        assert_eq!(
            resolve(&t, &input),
            Err(AliasError::TooDeep { limit: MAX_DEPTH })
        );
    }

    #[test]
    fn stacked_aliases_past_limit_fail() {
        // a0 = a1 & x, a1 = a2 & x, ... each alias adds one level
        let defs: Vec<(String, String)> = (0..300)
            .map(|i| (format!("a{i}"), format!("a{} & x", i + 1)))
            .collect();
        let t = AliasTable::parse(defs.iter().map(|(n, e)| (n.as_str(), e.as_str()))).unwrap();
        assert_eq!(
            resolve(&t, "a0"),
            Err(AliasError::TooDeep { limit: MAX_DEPTH })
        );
    }
}
