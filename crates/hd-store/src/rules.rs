//! Rule store interface and in-memory implementation
//!
//! Rules are edited as a unit: an update replaces the prior condition and
//! action sets wholesale. Listings return snapshot clones, so deleting a
//! rule while a dispatch pass is in flight never invalidates that pass's
//! rule set.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use hd_automation::{Rule, RuleConfig};
use hd_core::{RuleId, TriggerType};

use crate::error::{StoreError, StoreResult};

/// Read/write access to automation rules
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Snapshot all active rules for a trigger type, in creation order,
    /// with conditions and actions eagerly loaded
    async fn list_active_by_trigger(&self, trigger_type: TriggerType) -> StoreResult<Vec<Rule>>;

    /// Fetch a rule by id
    async fn get(&self, id: &RuleId) -> StoreResult<Rule>;

    /// Create a rule
    async fn create(&self, config: RuleConfig) -> StoreResult<RuleId>;

    /// Replace a rule's definition (replace-all-on-edit semantics)
    async fn update(&self, id: &RuleId, config: RuleConfig) -> StoreResult<()>;

    /// Delete a rule
    async fn delete(&self, id: &RuleId) -> StoreResult<()>;

    /// Enable or disable a rule
    async fn set_active(&self, id: &RuleId, is_active: bool) -> StoreResult<()>;
}

struct StoredRule {
    rule: Rule,
    /// Insertion sequence, the stable tie-break for equal priorities
    seq: u64,
}

/// In-memory rule store
#[derive(Default)]
pub struct MemoryRuleStore {
    rules: DashMap<RuleId, StoredRule>,
    next_seq: AtomicU64,
}

impl MemoryRuleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rules
    pub fn count(&self) -> usize {
        self.rules.len()
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn list_active_by_trigger(&self, trigger_type: TriggerType) -> StoreResult<Vec<Rule>> {
        let mut matching: Vec<(u64, Rule)> = self
            .rules
            .iter()
            .filter(|entry| entry.rule.matches_trigger(trigger_type))
            .map(|entry| (entry.seq, entry.rule.clone()))
            .collect();

        matching.sort_by_key(|(seq, _)| *seq);

        debug!(
            trigger_type = %trigger_type,
            count = matching.len(),
            "Snapshotted active rules"
        );

        Ok(matching.into_iter().map(|(_, rule)| rule).collect())
    }

    async fn get(&self, id: &RuleId) -> StoreResult<Rule> {
        self.rules
            .get(id)
            .map(|entry| entry.rule.clone())
            .ok_or_else(|| StoreError::RuleNotFound(id.clone()))
    }

    async fn create(&self, config: RuleConfig) -> StoreResult<RuleId> {
        let rule = Rule::from_config(config);
        let id = rule.id.clone();

        if self.rules.contains_key(&id) {
            return Err(StoreError::RuleExists(id));
        }

        info!(rule_id = %id, name = %rule.name, "Created rule");
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.rules.insert(id.clone(), StoredRule { rule, seq });
        Ok(id)
    }

    async fn update(&self, id: &RuleId, config: RuleConfig) -> StoreResult<()> {
        let mut entry = self
            .rules
            .get_mut(id)
            .ok_or_else(|| StoreError::RuleNotFound(id.clone()))?;

        // Identity and creation order survive the edit; everything else,
        // conditions and actions included, is replaced.
        let rule = &mut entry.rule;
        rule.name = config.name;
        rule.description = config.description;
        rule.trigger_type = config.trigger_type;
        rule.priority = config.priority;
        rule.is_active = config.is_active;
        rule.organization_id = config.organization_id;
        rule.conditions = config.conditions;
        rule.actions = config.actions;

        info!(rule_id = %id, "Updated rule");
        Ok(())
    }

    async fn delete(&self, id: &RuleId) -> StoreResult<()> {
        self.rules
            .remove(id)
            .map(|_| info!(rule_id = %id, "Deleted rule"))
            .ok_or_else(|| StoreError::RuleNotFound(id.clone()))
    }

    async fn set_active(&self, id: &RuleId, is_active: bool) -> StoreResult<()> {
        let mut entry = self
            .rules
            .get_mut(id)
            .ok_or_else(|| StoreError::RuleNotFound(id.clone()))?;

        entry.rule.is_active = is_active;
        info!(rule_id = %id, is_active, "Toggled rule");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hd_automation::Condition;
    use serde_json::json;

    fn config(name: &str, trigger_type: TriggerType) -> RuleConfig {
        RuleConfig {
            id: None,
            name: name.to_string(),
            description: None,
            trigger_type,
            priority: 0,
            is_active: true,
            organization_id: "org-1".to_string(),
            conditions: vec![],
            actions: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_and_list_by_trigger() {
        let store = MemoryRuleStore::new();
        store
            .create(config("a", TriggerType::TicketCreated))
            .await
            .unwrap();
        store
            .create(config("b", TriggerType::SlaBreach))
            .await
            .unwrap();
        store
            .create(config("c", TriggerType::TicketCreated))
            .await
            .unwrap();

        let rules = store
            .list_active_by_trigger(TriggerType::TicketCreated)
            .await
            .unwrap();

        // Creation order is preserved
        let names: Vec<&str> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_inactive_rules_are_excluded() {
        let store = MemoryRuleStore::new();
        let id = store
            .create(config("a", TriggerType::TicketCreated))
            .await
            .unwrap();

        store.set_active(&id, false).await.unwrap();
        let rules = store
            .list_active_by_trigger(TriggerType::TicketCreated)
            .await
            .unwrap();
        assert!(rules.is_empty());

        store.set_active(&id, true).await.unwrap();
        let rules = store
            .list_active_by_trigger(TriggerType::TicketCreated)
            .await
            .unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_conditions_and_actions() {
        let store = MemoryRuleStore::new();
        let mut cfg = config("a", TriggerType::TicketCreated);
        cfg.conditions = vec![Condition::equals("priority", json!("urgent"))];
        let id = store.create(cfg).await.unwrap();

        let mut replacement = config("a2", TriggerType::TicketCreated);
        replacement.conditions = vec![Condition::equals("status", json!("open"))];
        store.update(&id, replacement).await.unwrap();

        let rule = store.get(&id).await.unwrap();
        assert_eq!(rule.name, "a2");
        assert_eq!(rule.conditions.len(), 1);
        assert_eq!(rule.conditions[0].field, "status");
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = MemoryRuleStore::new();
        let mut cfg = config("a", TriggerType::TicketCreated);
        cfg.id = Some(RuleId::from("fixed"));
        store.create(cfg.clone()).await.unwrap();

        let err = store.create(cfg).await.unwrap_err();
        assert!(matches!(err, StoreError::RuleExists(_)));
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let store = MemoryRuleStore::new();
        let id = store
            .create(config("a", TriggerType::TimeBased))
            .await
            .unwrap();

        store.delete(&id).await.unwrap();
        assert!(matches!(
            store.get(&id).await.unwrap_err(),
            StoreError::RuleNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_listing_is_a_snapshot() {
        let store = MemoryRuleStore::new();
        let id = store
            .create(config("a", TriggerType::TicketCreated))
            .await
            .unwrap();

        let rules = store
            .list_active_by_trigger(TriggerType::TicketCreated)
            .await
            .unwrap();
        store.delete(&id).await.unwrap();

        // The snapshot is unaffected by the delete
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, id);
    }
}
