//! Teaching Queues
//!
//! The new-item queue and the learned pool, plus the mastery transition that
//! moves items from one to the other.

use crate::item::LearningItem;
use serde::{Deserialize, Serialize};

/// The two collections a learner's progress is made of.
///
/// The head of `new_queue` is the current target. `learned_pool` is a
/// multiset: historical duplicates by id are kept as they were persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queues {
    pub new_queue: Vec<LearningItem>,
    pub learned_pool: Vec<LearningItem>,
}

/// What a single learner turn did to the queues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEffect {
    /// The queue was already empty; nothing changed.
    NoTarget,
    /// The utterance did not contain the current target.
    Unchanged,
    /// The target was used but is still below the quota.
    Used { usage_count: u32 },
    /// The target reached the quota and moved to the learned pool.
    Mastered {
        item: LearningItem,
        next_target: Option<LearningItem>,
    },
}

impl TurnEffect {
    pub fn mastered(&self) -> Option<&LearningItem> {
        match self {
            TurnEffect::Mastered { item, .. } => Some(item),
            _ => None,
        }
    }
}

impl Queues {
    pub fn new(new_queue: Vec<LearningItem>, learned_pool: Vec<LearningItem>) -> Self {
        Self {
            new_queue,
            learned_pool,
        }
    }

    pub fn current_target(&self) -> Option<&LearningItem> {
        self.new_queue.first()
    }

    pub fn current_target_mut(&mut self) -> Option<&mut LearningItem> {
        self.new_queue.first_mut()
    }

    /// True once every new item has been mastered.
    pub fn is_exhausted(&self) -> bool {
        self.new_queue.is_empty()
    }

    /// Removes and returns the head of the new queue. The learned pool is untouched.
    pub fn dequeue_current_target(&mut self) -> Option<LearningItem> {
        if self.new_queue.is_empty() {
            None
        } else {
            Some(self.new_queue.remove(0))
        }
    }

    /// Marks an item learned and appends it to the pool without deduplicating.
    pub fn add_learned_item(&mut self, mut item: LearningItem) {
        item.is_learned = true;
        self.learned_pool.push(item);
    }

    /// Applies one learner utterance to the current target.
    ///
    /// A use is counted when the utterance contains the target's token. When the
    /// usage count reaches the quota the target is promoted and the next item in
    /// line becomes the target with its counters cleared for its introduction.
    pub fn apply_turn(&mut self, utterance: &str) -> TurnEffect {
        let Some(target) = self.new_queue.first_mut() else {
            return TurnEffect::NoTarget;
        };

        if !target.is_used_in(utterance) {
            return TurnEffect::Unchanged;
        }
        target.usage_count += 1;

        if !target.has_reached_quota() {
            return TurnEffect::Used {
                usage_count: target.usage_count,
            };
        }

        let mut item = self.new_queue.remove(0);
        item.is_learned = true;
        self.add_learned_item(item.clone());

        if let Some(next) = self.new_queue.first_mut() {
            next.reset_progress();
        }

        TurnEffect::Mastered {
            item,
            next_target: self.new_queue.first().cloned(),
        }
    }

    /// Bumps counters for items referenced in a coach line and a learner line.
    ///
    /// Ids in `coach_ids` add a presentation, ids in `learner_ids` add a use. In
    /// each collection only the first item carrying the id is updated.
    pub fn update_counts(&mut self, coach_ids: &[&str], learner_ids: &[&str]) {
        for id in coach_ids {
            if let Some(item) = self.new_queue.iter_mut().find(|it| it.id == *id) {
                item.presentation_count += 1;
            }
            if let Some(item) = self.learned_pool.iter_mut().find(|it| it.id == *id) {
                item.presentation_count += 1;
            }
        }
        for id in learner_ids {
            if let Some(item) = self.new_queue.iter_mut().find(|it| it.id == *id) {
                item.usage_count += 1;
            }
            if let Some(item) = self.learned_pool.iter_mut().find(|it| it.id == *id) {
                item.usage_count += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Queues {
        Queues::new(
            vec![
                LearningItem::new("id1", "text1").with_category("cat1", "sub1"),
                LearningItem::new("id2", "text2").with_category("cat2", "sub2"),
            ],
            vec![{
                let mut item = LearningItem::new("id3", "text3").with_counts(5, 5);
                item.is_learned = true;
                item
            }],
        )
    }

    #[test]
    fn test_dequeue_returns_head_and_removes_it() {
        let mut queues = fixture();
        let item = queues.dequeue_current_target().unwrap();

        assert_eq!(item.id, "id1");
        assert_eq!(queues.new_queue.len(), 1);
        assert!(queues.new_queue.iter().all(|it| it.id != "id1"));
        assert_eq!(queues.learned_pool.len(), 1);
    }

    #[test]
    fn test_dequeue_on_empty_queue_returns_none() {
        let mut queues = Queues::default();
        assert!(queues.dequeue_current_target().is_none());
    }

    #[test]
    fn test_add_learned_item_marks_learned() {
        let mut queues = fixture();
        queues.add_learned_item(LearningItem::new("id4", "text4"));

        assert_eq!(queues.learned_pool.len(), 2);
        let added = queues.learned_pool.last().unwrap();
        assert_eq!(added.id, "id4");
        assert!(added.is_learned);
    }

    #[test]
    fn test_learned_pool_keeps_duplicate_ids() {
        let mut queues = fixture();
        queues.add_learned_item(LearningItem::new("id3", "text3"));

        assert_eq!(queues.learned_pool.iter().filter(|it| it.id == "id3").count(), 2);
    }

    #[test]
    fn test_turn_with_token_increments_usage() {
        let mut queues = Queues::new(vec![LearningItem::new("id1", "token1")], vec![]);

        let effect = queues.apply_turn("User says token1");

        assert_eq!(effect, TurnEffect::Used { usage_count: 1 });
        assert_eq!(queues.new_queue[0].usage_count, 1);
    }

    #[test]
    fn test_turn_without_token_leaves_item_alone() {
        let mut queues = Queues::new(vec![LearningItem::new("id1", "token1").with_counts(1, 1)], vec![]);

        let effect = queues.apply_turn("User says something else");

        assert_eq!(effect, TurnEffect::Unchanged);
        assert_eq!(queues.new_queue[0].usage_count, 1);
        assert_eq!(queues.new_queue[0].presentation_count, 1);
    }

    #[test]
    fn test_turn_on_empty_queue_is_noop() {
        let mut queues = Queues::default();
        assert_eq!(queues.apply_turn("anything"), TurnEffect::NoTarget);
        assert!(queues.learned_pool.is_empty());
    }

    #[test]
    fn test_reaching_quota_promotes_target() {
        let mut queues = Queues::new(
            vec![
                LearningItem::new("id1", "token1").with_counts(1, 2),
                LearningItem::new("id2", "token2").with_counts(2, 1),
            ],
            vec![],
        );

        let effect = queues.apply_turn("User says token1");

        let mastered = effect.mastered().unwrap();
        assert_eq!(mastered.id, "id1");
        assert_eq!(mastered.usage_count, 3);
        assert!(mastered.is_learned);

        assert_eq!(queues.new_queue.len(), 1);
        assert_eq!(queues.learned_pool.len(), 1);
        assert!(queues.learned_pool[0].is_learned);
        assert_eq!(queues.learned_pool[0].usage_count, 3);

        let next = queues.current_target().unwrap();
        assert_eq!(next.id, "id2");
        assert_eq!(next.presentation_count, 0);
        assert_eq!(next.usage_count, 0);
    }

    #[test]
    fn test_mastering_last_item_exhausts_queue() {
        let mut queues = Queues::new(vec![LearningItem::new("id1", "token1").with_counts(1, 2)], vec![]);

        let effect = queues.apply_turn("token1!");

        assert!(matches!(effect, TurnEffect::Mastered { next_target: None, .. }));
        assert!(queues.is_exhausted());
        assert_eq!(queues.learned_pool.len(), 1);
    }

    #[test]
    fn test_non_matching_turn_keeps_head() {
        let mut queues = Queues::new(
            vec![LearningItem::new("A", "apfel"), LearningItem::new("B", "birne")],
            vec![],
        );

        queues.apply_turn("birne");
        assert_eq!(queues.current_target().unwrap().id, "A");
        assert_eq!(queues.current_target().unwrap().usage_count, 0);

        for _ in 0..3 {
            queues.apply_turn("Ich esse einen Apfel");
        }

        assert_eq!(queues.learned_pool[0].id, "A");
        assert!(queues.learned_pool[0].is_learned);
        assert_eq!(queues.current_target().unwrap().id, "B");
    }

    #[test]
    fn test_update_counts_for_coach_and_learner_items() {
        let mut queues = fixture();

        queues.update_counts(&["id1", "id3"], &[]);
        assert_eq!(queues.new_queue[0].presentation_count, 1);
        assert_eq!(queues.learned_pool[0].presentation_count, 6);

        queues.update_counts(&[], &["id1", "id3"]);
        assert_eq!(queues.new_queue[0].usage_count, 1);
        assert_eq!(queues.learned_pool[0].usage_count, 6);
    }

    #[test]
    fn test_update_counts_ignores_unknown_ids() {
        let mut queues = fixture();
        let before = queues.clone();

        queues.update_counts(&["missing"], &["also_missing"]);

        assert_eq!(queues, before);
    }

    #[test]
    fn test_clone_is_independent() {
        let queues = fixture();
        let mut copied = queues.clone();

        copied.new_queue.push(LearningItem::new("id4", "text4"));
        copied.learned_pool.remove(0);
        copied.new_queue[0].usage_count = 9;

        assert_eq!(queues.new_queue.len(), 2);
        assert_eq!(queues.learned_pool.len(), 1);
        assert_eq!(queues.new_queue[0].usage_count, 0);
        assert_eq!(copied.new_queue.len(), 3);
        assert!(copied.learned_pool.is_empty());
    }
}
