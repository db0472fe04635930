//! Client-side state of the period scheduler.
//!
//! Adding a period applies at once. Moving, resizing and removing are staged
//! as a [`PendingChange`] and only take effect on [`CalendarAction::Confirm`].
//! Nothing here reaches the network.

use campus_api::EntityId;
use campus_core::ActionKind;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const SLICE: &str = "calendar";

/// A scheduled period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub id: Uuid,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub class_id: Option<EntityId>,
    pub batch_id: Option<EntityId>,
    pub employee_id: Option<EntityId>,
}

impl Period {
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            start,
            end,
            class_id: None,
            batch_id: None,
            employee_id: None,
        }
    }

    pub fn for_class(mut self, class_id: impl Into<EntityId>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    pub fn for_batch(mut self, batch_id: impl Into<EntityId>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    pub fn taught_by(mut self, employee_id: impl Into<EntityId>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }

    fn overlaps_days(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        from.map_or(true, |from| self.end.date() >= from) && to.map_or(true, |to| self.start.date() <= to)
    }
}

/// An edit waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingChange {
    Reschedule { id: Uuid, start: NaiveDateTime, end: NaiveDateTime },
    Remove { id: Uuid },
}

impl PendingChange {
    pub fn period_id(&self) -> Uuid {
        match self {
            Self::Reschedule { id, .. } | Self::Remove { id } => *id,
        }
    }
}

/// Which periods are shown. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarFilter {
    pub class_id: Option<EntityId>,
    pub batch_id: Option<EntityId>,
    pub employee_id: Option<EntityId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl CalendarFilter {
    fn matches(&self, period: &Period) -> bool {
        fn same(wanted: &Option<EntityId>, actual: &Option<EntityId>) -> bool {
            wanted.is_none() || wanted == actual
        }
        same(&self.class_id, &period.class_id)
            && same(&self.batch_id, &period.batch_id)
            && same(&self.employee_id, &period.employee_id)
            && period.overlaps_days(self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("period must end after it starts ({start} .. {end})")]
    InvalidRange { start: NaiveDateTime, end: NaiveDateTime },

    #[error("period moved to {start} would end past the latest representable time")]
    OutOfRange { start: NaiveDateTime },

    #[error("no period with id {0}")]
    UnknownPeriod(Uuid),

    #[error("no change is waiting for confirmation")]
    NothingPending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalendarAction {
    /// Replaces every period, e.g. with a saved timetable.
    Load(Vec<Period>),
    Add(Period),
    /// Drag and drop. Keeps the period's duration.
    Move { id: Uuid, start: NaiveDateTime },
    Resize { id: Uuid, start: NaiveDateTime, end: NaiveDateTime },
    Remove { id: Uuid },
    Confirm,
    Cancel,
    Filter(CalendarFilter),
}

impl CalendarAction {
    pub fn kind(&self) -> ActionKind {
        let operation = match self {
            Self::Load(_) => "load",
            Self::Add(_) => "add",
            Self::Move { .. } => "move",
            Self::Resize { .. } => "resize",
            Self::Remove { .. } => "remove",
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Filter(_) => "filter",
        };
        ActionKind::command(SLICE, operation)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarState {
    pub periods: Vec<Period>,
    pub pending: Option<PendingChange>,
    pub filter: CalendarFilter,
    /// Why the last edit was refused, cleared by the next accepted one.
    pub rejected: Option<CalendarError>,
}

impl CalendarState {
    pub fn reduce(&mut self, action: &CalendarAction) {
        let outcome = match action {
            CalendarAction::Load(periods) => {
                self.periods = periods.clone();
                self.pending = None;
                Ok(())
            }
            CalendarAction::Add(period) => self.add(period),
            CalendarAction::Move { id, start } => self.stage_move(*id, *start),
            CalendarAction::Resize { id, start, end } => self.stage_resize(*id, *start, *end),
            CalendarAction::Remove { id } => self.stage_remove(*id),
            CalendarAction::Confirm => self.confirm(),
            CalendarAction::Cancel => {
                self.pending = None;
                Ok(())
            }
            CalendarAction::Filter(filter) => {
                self.filter = filter.clone();
                Ok(())
            }
        };

        match outcome {
            Ok(()) => self.rejected = None,
            Err(err) => {
                tracing::debug!(action = %action.kind(), error = %err, "calendar edit rejected");
                self.rejected = Some(err);
            }
        }
    }

    /// Periods passing the current filter, earliest first. Pending changes
    /// are not reflected.
    pub fn visible(&self) -> Vec<&Period> {
        let mut periods: Vec<&Period> = self.periods.iter().filter(|p| self.filter.matches(p)).collect();
        periods.sort_by_key(|p| p.start);
        periods
    }

    pub fn period(&self, id: Uuid) -> Option<&Period> {
        self.periods.iter().find(|p| p.id == id)
    }

    fn add(&mut self, period: &Period) -> Result<(), CalendarError> {
        check_range(period.start, period.end)?;
        self.periods.push(period.clone());
        Ok(())
    }

    fn stage_move(&mut self, id: Uuid, start: NaiveDateTime) -> Result<(), CalendarError> {
        let period = self.period(id).ok_or(CalendarError::UnknownPeriod(id))?;
        let end = start
            .checked_add_signed(period.end - period.start)
            .ok_or(CalendarError::OutOfRange { start })?;
        self.pending = Some(PendingChange::Reschedule { id, start, end });
        Ok(())
    }

    fn stage_resize(&mut self, id: Uuid, start: NaiveDateTime, end: NaiveDateTime) -> Result<(), CalendarError> {
        self.period(id).ok_or(CalendarError::UnknownPeriod(id))?;
        check_range(start, end)?;
        self.pending = Some(PendingChange::Reschedule { id, start, end });
        Ok(())
    }

    fn stage_remove(&mut self, id: Uuid) -> Result<(), CalendarError> {
        self.period(id).ok_or(CalendarError::UnknownPeriod(id))?;
        self.pending = Some(PendingChange::Remove { id });
        Ok(())
    }

    fn confirm(&mut self) -> Result<(), CalendarError> {
        let change = self.pending.take().ok_or(CalendarError::NothingPending)?;
        match change {
            PendingChange::Reschedule { id, start, end } => {
                let period = self
                    .periods
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or(CalendarError::UnknownPeriod(id))?;
                period.start = start;
                period.end = end;
            }
            PendingChange::Remove { id } => self.periods.retain(|p| p.id != id),
        }
        Ok(())
    }
}

fn check_range(start: NaiveDateTime, end: NaiveDateTime) -> Result<(), CalendarError> {
    if end <= start {
        return Err(CalendarError::InvalidRange { start, end });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn with_period(period: &Period) -> CalendarState {
        let mut state = CalendarState::default();
        state.reduce(&CalendarAction::Add(period.clone()));
        state
    }

    // =========================================================================
    // Editing
    // =========================================================================

    #[test]
    fn test_add_rejects_empty_or_inverted_range() {
        let mut state = CalendarState::default();
        state.reduce(&CalendarAction::Add(Period::new("Maths", at(1, 9), at(1, 9))));
        assert!(matches!(state.rejected, Some(CalendarError::InvalidRange { .. })));
        assert!(state.periods.is_empty());

        state.reduce(&CalendarAction::Add(Period::new("Maths", at(1, 9), at(1, 10))));
        assert_eq!(state.rejected, None);
        assert_eq!(state.periods.len(), 1);
    }

    #[test]
    fn test_move_keeps_duration_and_waits_for_confirm() {
        let period = Period::new("Physics", at(2, 9), at(2, 11));
        let mut state = with_period(&period);

        state.reduce(&CalendarAction::Move { id: period.id, start: at(3, 13) });
        assert_eq!(state.period(period.id).unwrap().start, at(2, 9));
        assert_eq!(
            state.pending,
            Some(PendingChange::Reschedule {
                id: period.id,
                start: at(3, 13),
                end: at(3, 15)
            })
        );

        state.reduce(&CalendarAction::Confirm);
        let moved = state.period(period.id).unwrap();
        assert_eq!((moved.start, moved.end), (at(3, 13), at(3, 15)));
        assert_eq!(state.pending, None);
    }

    #[test]
    fn test_cancel_discards_pending_change() {
        let period = Period::new("Chemistry", at(4, 9), at(4, 10));
        let mut state = with_period(&period);

        state.reduce(&CalendarAction::Remove { id: period.id });
        state.reduce(&CalendarAction::Cancel);

        assert_eq!(state.pending, None);
        assert_eq!(state.periods.len(), 1);
    }

    #[test]
    fn test_confirmed_remove_deletes_period() {
        let period = Period::new("History", at(5, 9), at(5, 10));
        let mut state = with_period(&period);

        state.reduce(&CalendarAction::Remove { id: period.id });
        state.reduce(&CalendarAction::Confirm);

        assert!(state.periods.is_empty());
    }

    #[test]
    fn test_invalid_resize_is_not_staged() {
        let period = Period::new("Art", at(6, 9), at(6, 10));
        let mut state = with_period(&period);

        state.reduce(&CalendarAction::Resize {
            id: period.id,
            start: at(6, 9),
            end: at(6, 8),
        });

        assert_eq!(state.pending, None);
        assert!(matches!(state.rejected, Some(CalendarError::InvalidRange { .. })));
    }

    #[test]
    fn test_move_past_latest_time_is_not_staged() {
        let period = Period::new("Art", at(6, 9), at(6, 10));
        let mut state = with_period(&period);

        state.reduce(&CalendarAction::Move {
            id: period.id,
            start: NaiveDateTime::MAX,
        });

        assert_eq!(state.pending, None);
        assert_eq!(state.rejected, Some(CalendarError::OutOfRange { start: NaiveDateTime::MAX }));
        assert_eq!(state.periods, vec![period]);
    }

    #[test]
    fn test_unknown_period_and_empty_confirm_are_rejected() {
        let mut state = CalendarState::default();
        let id = Uuid::new_v4();

        state.reduce(&CalendarAction::Move { id, start: at(1, 9) });
        assert_eq!(state.rejected, Some(CalendarError::UnknownPeriod(id)));

        state.reduce(&CalendarAction::Confirm);
        assert_eq!(state.rejected, Some(CalendarError::NothingPending));
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    #[test]
    fn test_visible_applies_every_filter_and_sorts() {
        let late = Period::new("Maths", at(10, 14), at(10, 15)).for_class("c1").taught_by("e1");
        let early = Period::new("Maths", at(10, 9), at(10, 10)).for_class("c1").taught_by("e1");
        let other_teacher = Period::new("Maths", at(10, 11), at(10, 12)).for_class("c1").taught_by("e2");
        let other_class = Period::new("Maths", at(10, 11), at(10, 12)).for_class("c2").taught_by("e1");
        let next_week = Period::new("Maths", at(17, 9), at(17, 10)).for_class("c1").taught_by("e1");

        let mut state = CalendarState::default();
        state.reduce(&CalendarAction::Load(vec![
            late.clone(),
            other_teacher,
            early.clone(),
            other_class,
            next_week,
        ]));
        state.reduce(&CalendarAction::Filter(CalendarFilter {
            class_id: Some(EntityId::new("c1")),
            employee_id: Some(EntityId::new("e1")),
            from: NaiveDate::from_ymd_opt(2025, 9, 8),
            to: NaiveDate::from_ymd_opt(2025, 9, 14),
            ..CalendarFilter::default()
        }));

        assert_eq!(state.visible(), vec![&early, &late]);
    }

    #[test]
    fn test_batch_filter_excludes_unassigned_periods() {
        let assigned = Period::new("Music", at(8, 9), at(8, 10)).for_batch("b1");
        let unassigned = Period::new("Music", at(8, 11), at(8, 12));

        let mut state = CalendarState::default();
        state.reduce(&CalendarAction::Load(vec![assigned.clone(), unassigned]));
        state.reduce(&CalendarAction::Filter(CalendarFilter {
            batch_id: Some(EntityId::new("b1")),
            ..CalendarFilter::default()
        }));

        assert_eq!(state.visible(), vec![&assigned]);
    }
}
