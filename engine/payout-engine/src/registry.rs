use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::{PayoutError, Result};
use crate::template::{PayoutTemplate, TemplateSlot};

/// Template Registry - maps template keys to payout templates
///
/// Populated once at startup through [`TemplateRegistryBuilder`] and read-only
/// afterwards, so a shared reference can serve concurrent calculations.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    /// Map from template key to template
    templates: BTreeMap<String, PayoutTemplate>,
}

impl TemplateRegistry {
    /// Registry holding only the built-in templates
    pub fn builtin() -> Result<Self> {
        Self::builder().with_builtins().build()
    }

    pub fn builder() -> TemplateRegistryBuilder {
        TemplateRegistryBuilder::default()
    }

    /// Look up a template by key
    pub fn resolve(&self, key: &str) -> Result<&PayoutTemplate> {
        self.templates
            .get(key)
            .ok_or_else(|| PayoutError::UnknownTemplate { key: key.to_string() })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// Registered keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn templates(&self) -> impl Iterator<Item = &PayoutTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Collects built-in and tenant templates before freezing them into a registry
#[derive(Debug, Default)]
pub struct TemplateRegistryBuilder {
    builtins: Vec<PayoutTemplate>,
    custom: Vec<PayoutTemplate>,
}

impl TemplateRegistryBuilder {
    pub fn with_builtins(mut self) -> Self {
        self.builtins = builtin_templates();
        self
    }

    /// Add tenant-supplied templates. Keys already taken by a built-in are skipped.
    pub fn with_custom(mut self, templates: impl IntoIterator<Item = PayoutTemplate>) -> Self {
        self.custom.extend(templates);
        self
    }

    /// Validate every template and freeze the registry
    pub fn build(self) -> Result<TemplateRegistry> {
        let mut templates = BTreeMap::new();

        for template in self.builtins {
            template.validate()?;
            templates.insert(template.key.clone(), template);
        }
        let builtin_count = templates.len();

        let mut custom_keys: Vec<String> = Vec::with_capacity(self.custom.len());
        for template in self.custom {
            template.validate()?;

            if custom_keys.contains(&template.key) {
                return Err(PayoutError::malformed(
                    &template.key,
                    "custom template key registered twice",
                ));
            }
            custom_keys.push(template.key.clone());

            if templates.contains_key(&template.key) {
                warn!("Custom template '{}' collides with a built-in template, keeping the built-in", template.key);
                continue;
            }
            templates.insert(template.key.clone(), template);
        }

        info!(
            "Template registry ready: {} built-in, {} custom",
            builtin_count,
            templates.len() - builtin_count
        );
        Ok(TemplateRegistry { templates })
    }
}

/// Built-in payout templates
pub fn builtin_templates() -> Vec<PayoutTemplate> {
    vec![
        PayoutTemplate::new(
            "top3",
            vec![
                TemplateSlot::single(1, Decimal::new(6, 1)),
                TemplateSlot::single(2, Decimal::new(3, 1)),
                TemplateSlot::single(3, Decimal::new(1, 1)),
            ],
        ),
        PayoutTemplate::new(
            "top4",
            vec![
                TemplateSlot::single(1, Decimal::new(5, 1)),
                TemplateSlot::single(2, Decimal::new(3, 1)),
                TemplateSlot::single(3, Decimal::new(125, 3)),
                TemplateSlot::single(4, Decimal::new(75, 3)),
            ],
        ),
        PayoutTemplate::new(
            "top8",
            vec![
                TemplateSlot::single(1, Decimal::new(35, 2)),
                TemplateSlot::single(2, Decimal::new(22, 2)),
                TemplateSlot::single(3, Decimal::new(15, 2)),
                TemplateSlot::single(4, Decimal::new(10, 2)),
                TemplateSlot::single(5, Decimal::new(6, 2)),
                TemplateSlot::range(6, 8, Decimal::new(12, 2)),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winner_take_all(key: &str) -> PayoutTemplate {
        PayoutTemplate::new(key, vec![TemplateSlot::single(1, Decimal::ONE)])
    }

    #[test]
    fn test_builtin_registry() {
        let registry = TemplateRegistry::builtin().unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["top3", "top4", "top8"]);

        let top4 = registry.resolve("top4").unwrap();
        assert_eq!(top4.paid_places(), 4);
        assert_eq!(top4.place_shares()[2], Decimal::new(125, 3));

        let top8 = registry.resolve("top8").unwrap();
        assert_eq!(top8.place_shares()[7], Decimal::new(4, 2));
    }

    #[test]
    fn test_unknown_template() {
        let registry = TemplateRegistry::builtin().unwrap();
        assert_eq!(
            registry.resolve("top5").unwrap_err(),
            PayoutError::UnknownTemplate { key: "top5".to_string() }
        );
    }

    #[test]
    fn test_custom_templates() {
        let registry = TemplateRegistry::builder()
            .with_builtins()
            .with_custom(vec![winner_take_all("winner")])
            .build()
            .unwrap();

        assert!(registry.contains("winner"));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_builtin_wins_on_collision() {
        let registry = TemplateRegistry::builder()
            .with_builtins()
            .with_custom(vec![winner_take_all("top4")])
            .build()
            .unwrap();

        assert_eq!(registry.resolve("top4").unwrap().paid_places(), 4);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_custom_key_rejected() {
        let result = TemplateRegistry::builder()
            .with_custom(vec![winner_take_all("winner"), winner_take_all("winner")])
            .build();

        assert!(matches!(result, Err(PayoutError::MalformedTemplate { .. })));
    }

    #[test]
    fn test_malformed_custom_template_fails_build() {
        let broken = PayoutTemplate::new("broken", vec![TemplateSlot::single(1, Decimal::new(9, 1))]);
        let result = TemplateRegistry::builder().with_builtins().with_custom(vec![broken]).build();

        assert_eq!(
            result.unwrap_err(),
            PayoutError::MalformedTemplate {
                key: "broken".to_string(),
                message: "shares sum to 0.9, expected 1".to_string(),
            }
        );
    }

    #[test]
    fn test_huge_custom_share_fails_build() {
        let huge = PayoutTemplate::new(
            "huge",
            vec![TemplateSlot::single(1, Decimal::MAX), TemplateSlot::single(2, Decimal::MAX)],
        );
        let result = TemplateRegistry::builder().with_builtins().with_custom(vec![huge]).build();

        assert!(matches!(result, Err(PayoutError::MalformedTemplate { ref key, .. }) if key == "huge"));
    }
}
