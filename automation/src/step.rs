use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 与外部交换的步骤记录：类型字符串 + 参数表。
///
/// 未知的 `type` 在反序列化阶段照常接受，只在执行时报
/// `UnknownStepType`，保证数据模型向前兼容。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl StepRecord {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: Map::new(),
        }
    }

    /// 链式写入一个参数，便于手工构造步骤。
    #[allow(dead_code)]
    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

/// 步骤的稳定标识：插入时分配一次，之后不变也不复用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step_{}", self.0)
    }
}

/// 带标识的步骤。
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: StepId,
    pub record: StepRecord,
}

/// 有序步骤列表：插入顺序即执行顺序，除非显式调整。
///
/// 所有按下标的操作都做边界检查，越界一律返回空值/false，绝不 panic。
#[derive(Debug, Default)]
pub struct StepList {
    steps: Vec<Step>,
    next_id: u64,
}

impl StepList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加步骤：分配 id 并返回带 id 的副本。
    pub fn add(&mut self, record: StepRecord) -> Step {
        let step = Step {
            id: StepId(self.next_id),
            record,
        };
        self.next_id += 1;
        self.steps.push(step.clone());
        step
    }

    /// 按下标移除；越界返回 None。
    #[allow(dead_code)]
    pub fn remove_at(&mut self, index: usize) -> Option<Step> {
        if index < self.steps.len() {
            Some(self.steps.remove(index))
        } else {
            None
        }
    }

    /// 把 `old_index` 处的步骤移动到 `new_index`；
    /// 任一下标越界时返回 false 且列表保持原样。
    #[allow(dead_code)]
    pub fn reorder(&mut self, old_index: usize, new_index: usize) -> bool {
        if old_index >= self.steps.len() || new_index >= self.steps.len() {
            return false;
        }
        let step = self.steps.remove(old_index);
        self.steps.insert(new_index, step);
        true
    }

    #[allow(dead_code)]
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    #[allow(dead_code)]
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{StepList, StepRecord};

    fn record(kind: &str) -> StepRecord {
        StepRecord::new(kind)
    }

    #[test]
    fn add_assigns_sequential_ids() {
        let mut list = StepList::new();
        let a = list.add(record("delay"));
        let b = list.add(record("click"));
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.to_string(), "step_0");
        assert_eq!(b.id.to_string(), "step_1");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn ids_are_never_reused_after_removal() {
        let mut list = StepList::new();
        list.add(record("a"));
        list.add(record("b"));
        let removed = list.remove_at(0).unwrap();
        let c = list.add(record("c"));
        assert_ne!(c.id, removed.id);
        assert_eq!(c.id.to_string(), "step_2");
    }

    #[test]
    fn reorder_moves_step_and_keeps_ids() {
        let mut list = StepList::new();
        let a = list.add(record("a"));
        let b = list.add(record("b"));
        let c = list.add(record("c"));

        assert!(list.reorder(0, 2));
        let order: Vec<_> = list.iter().map(|s| s.id).collect();
        assert_eq!(order, vec![b.id, c.id, a.id]);
        assert_eq!(list.get(2).unwrap().record.kind, "a");
    }

    #[test]
    fn reorder_rejects_out_of_bounds_without_mutation() {
        let mut list = StepList::new();
        let a = list.add(record("a"));
        let b = list.add(record("b"));

        assert!(!list.reorder(0, 2));
        assert!(!list.reorder(5, 0));
        let order: Vec<_> = list.iter().map(|s| s.id).collect();
        assert_eq!(order, vec![a.id, b.id]);
    }

    #[test]
    fn out_of_bounds_lookups_return_none() {
        let mut list = StepList::new();
        assert!(list.remove_at(0).is_none());
        assert!(list.get(0).is_none());
        list.add(record("a"));
        assert!(list.get(1).is_none());
    }

    #[test]
    fn clear_empties_the_list() {
        let mut list = StepList::new();
        list.add(record("a"));
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn unknown_kinds_survive_deserialization() {
        let json = r#"{"type": "teleport", "params": {"x": 1}}"#;
        let parsed: StepRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, "teleport");
        assert_eq!(parsed.params["x"], 1);

        let json = r#"{"type": "delay"}"#;
        let parsed: StepRecord = serde_json::from_str(json).unwrap();
        assert!(parsed.params.is_empty());
    }
}
