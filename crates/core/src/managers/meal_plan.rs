//! Meal-planning calendar mutations

use std::sync::Arc;

use chrono::NaiveDate;
use listsync_domain::{EventDraft, OperationId, OperationPayload};

use super::new_entity_id;
use crate::sync::OperationQueue;

/// Builds calendar operations for one meal-planning calendar.
pub struct MealPlanManager {
    queue: Arc<OperationQueue>,
    calendar_id: String,
}

impl MealPlanManager {
    pub fn new(queue: Arc<OperationQueue>, calendar_id: impl Into<String>) -> Self {
        Self { queue, calendar_id: calendar_id.into() }
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Plan a recipe on `date`; returns the event identifier.
    pub fn schedule_recipe(&self, date: NaiveDate, recipe_id: &str) -> String {
        self.create_event(EventDraft {
            event_id: new_entity_id(),
            date,
            title: None,
            recipe_id: Some(recipe_id.into()),
            label_id: None,
        })
    }

    /// Free-text entry on `date`; returns the event identifier.
    pub fn add_note(&self, date: NaiveDate, title: impl Into<String>) -> String {
        self.create_event(EventDraft {
            event_id: new_entity_id(),
            date,
            title: Some(title.into()),
            recipe_id: None,
            label_id: None,
        })
    }

    /// Queue a caller-built event; returns its identifier.
    pub fn create_event(&self, event: EventDraft) -> String {
        let event_id = event.event_id.clone();
        self.queue
            .add_operation(OperationPayload::NewEvent { calendar_id: self.calendar_id.clone(), event });
        event_id
    }

    /// Replace the event with the same `event_id`.
    pub fn update_event(&self, event: EventDraft) -> OperationId {
        self.queue.add_operation(OperationPayload::UpdateEvent {
            calendar_id: self.calendar_id.clone(),
            event,
        })
    }

    /// Remove several events in one operation.
    pub fn delete_events(&self, event_ids: Vec<String>) -> OperationId {
        self.queue.add_operation(OperationPayload::DeleteEvent {
            calendar_id: self.calendar_id.clone(),
            event_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use listsync_domain::SyncDomain;

    use super::*;
    use crate::managers::test_support::{payloads, queue};

    #[test]
    fn events_target_the_configured_calendar() {
        let queue = queue(SyncDomain::MealPlan);
        let manager = MealPlanManager::new(Arc::clone(&queue), "cal-1");
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();

        let event_id = manager.schedule_recipe(date, "recipe-1");
        manager.add_note(date, "Leftovers");
        manager.delete_events(vec![event_id.clone()]);

        let pending = payloads(&queue);
        match &pending[0] {
            OperationPayload::NewEvent { calendar_id, event } => {
                assert_eq!(calendar_id, "cal-1");
                assert_eq!(event.event_id, event_id);
                assert_eq!(event.recipe_id.as_deref(), Some("recipe-1"));
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(
            pending[2],
            OperationPayload::DeleteEvent { calendar_id: "cal-1".into(), event_ids: vec![event_id] }
        );
    }
}
