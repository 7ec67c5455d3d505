//! CREATE_SCHEDULE and MODIFY_SCHEDULE.
//!
//! ```text
//! <create_schedule>
//!   <name>…</name>
//!   <first_time>
//!     <minute>30</minute><hour>2</hour>
//!     <day_of_month>15</day_of_month><month>3</month><year>2026</year>
//!   </first_time>
//!   <duration>2<unit>hour</unit></duration>
//!   <period>1<unit>week</unit></period>
//!   <timezone>UTC</timezone>
//! </create_schedule>
//! ```

use omp_core::event::Attrs;

use crate::command::{Command, CreateSchedule, ModifySchedule, ScheduleTime, TimedValue};

use super::{append, ElementParser, EndResult, StartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    Name,
    Comment,
    FirstTime,
    FtMinute,
    FtHour,
    FtDayOfMonth,
    FtMonth,
    FtYear,
    Duration,
    DurationUnit,
    Period,
    PeriodUnit,
    Timezone,
}

/// Shared element handling for the two schedule grammars.
struct ScheduleGrammar {
    state: State,
    name: Option<String>,
    comment: Option<String>,
    first_time: ScheduleTime,
    duration: Option<TimedValue>,
    period: Option<TimedValue>,
    timezone: Option<String>,
}

impl ScheduleGrammar {
    fn new() -> Self {
        ScheduleGrammar {
            state: State::Root,
            name: None,
            comment: None,
            first_time: ScheduleTime::default(),
            duration: None,
            period: None,
            timezone: None,
        }
    }

    fn start(&mut self, name: &str) -> StartResult {
        let next = match (self.state, name) {
            (State::Root, "name") => State::Name,
            (State::Root, "comment") => State::Comment,
            (State::Root, "first_time") => State::FirstTime,
            (State::FirstTime, "minute") => State::FtMinute,
            (State::FirstTime, "hour") => State::FtHour,
            (State::FirstTime, "day_of_month") => State::FtDayOfMonth,
            (State::FirstTime, "month") => State::FtMonth,
            (State::FirstTime, "year") => State::FtYear,
            (State::Root, "duration") => {
                self.duration = Some(TimedValue::default());
                State::Duration
            }
            (State::Duration, "unit") => State::DurationUnit,
            (State::Root, "period") => {
                self.period = Some(TimedValue::default());
                State::Period
            }
            (State::Period, "unit") => State::PeriodUnit,
            (State::Root, "timezone") => State::Timezone,
            _ => return StartResult::Unknown,
        };
        self.state = next;
        StartResult::Consumed
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Name => append(&mut self.name, text),
            State::Comment => append(&mut self.comment, text),
            State::FtMinute => append(&mut self.first_time.minute, text),
            State::FtHour => append(&mut self.first_time.hour, text),
            State::FtDayOfMonth => append(&mut self.first_time.day_of_month, text),
            State::FtMonth => append(&mut self.first_time.month, text),
            State::FtYear => append(&mut self.first_time.year, text),
            State::Duration => {
                if let Some(duration) = self.duration.as_mut() {
                    duration.value.push_str(text);
                }
            }
            State::DurationUnit => {
                if let Some(duration) = self.duration.as_mut() {
                    append(&mut duration.unit, text);
                }
            }
            State::Period => {
                if let Some(period) = self.period.as_mut() {
                    period.value.push_str(text);
                }
            }
            State::PeriodUnit => {
                if let Some(period) = self.period.as_mut() {
                    append(&mut period.unit, text);
                }
            }
            State::Timezone => append(&mut self.timezone, text),
            State::Root | State::FirstTime => {}
        }
    }

    /// Returns true when the root element closed.
    fn end(&mut self) -> bool {
        self.state = match self.state {
            State::Root => return true,
            State::FtMinute | State::FtHour | State::FtDayOfMonth | State::FtMonth
            | State::FtYear => State::FirstTime,
            State::DurationUnit => State::Duration,
            State::PeriodUnit => State::Period,
            _ => State::Root,
        };
        false
    }
}

pub struct CreateScheduleParser {
    grammar: ScheduleGrammar,
}

impl CreateScheduleParser {
    pub fn new() -> Self {
        CreateScheduleParser {
            grammar: ScheduleGrammar::new(),
        }
    }
}

impl ElementParser for CreateScheduleParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        self.grammar.start(name)
    }

    fn text(&mut self, text: &str) {
        self.grammar.text(text);
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        if !self.grammar.end() {
            return EndResult::Open;
        }
        let grammar = std::mem::replace(&mut self.grammar, ScheduleGrammar::new());
        EndResult::Complete(Command::CreateSchedule(CreateSchedule {
            name: grammar.name,
            comment: grammar.comment,
            first_time: grammar.first_time,
            duration: grammar.duration,
            period: grammar.period,
            timezone: grammar.timezone,
        }))
    }
}

pub struct ModifyScheduleParser {
    grammar: ScheduleGrammar,
    schedule_id: Option<String>,
}

impl ModifyScheduleParser {
    pub fn new(attrs: &Attrs) -> Self {
        ModifyScheduleParser {
            grammar: ScheduleGrammar::new(),
            schedule_id: attrs.get_owned("schedule_id"),
        }
    }
}

impl ElementParser for ModifyScheduleParser {
    fn start_element(&mut self, name: &str, _attrs: &Attrs) -> StartResult {
        self.grammar.start(name)
    }

    fn text(&mut self, text: &str) {
        self.grammar.text(text);
    }

    fn end_element(&mut self, _name: &str) -> EndResult {
        if !self.grammar.end() {
            return EndResult::Open;
        }
        let grammar = std::mem::replace(&mut self.grammar, ScheduleGrammar::new());
        EndResult::Complete(Command::ModifySchedule(ModifySchedule {
            schedule_id: self.schedule_id.take(),
            name: grammar.name,
            comment: grammar.comment,
            first_time: grammar.first_time,
            duration: grammar.duration,
            period: grammar.period,
            timezone: grammar.timezone,
        }))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_values_take_leading_text_and_unit() {
        let mut parser = CreateScheduleParser::new();
        parser.start_element("period", &Attrs::default());
        parser.text("1");
        parser.start_element("unit", &Attrs::default());
        parser.text("week");
        parser.end_element("unit");
        parser.end_element("period");
        match parser.end_element("create_schedule") {
            EndResult::Complete(Command::CreateSchedule(data)) => {
                let period = data.period.expect("period");
                assert_eq!(period.value, "1");
                assert_eq!(period.unit.as_deref(), Some("week"));
                assert!(data.duration.is_none());
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn first_time_fields_nest() {
        let mut parser = CreateScheduleParser::new();
        parser.start_element("first_time", &Attrs::default());
        for (tag, value) in [("minute", "30"), ("hour", "2"), ("day_of_month", "15")] {
            parser.start_element(tag, &Attrs::default());
            parser.text(value);
            parser.end_element(tag);
        }
        parser.end_element("first_time");
        match parser.end_element("create_schedule") {
            EndResult::Complete(Command::CreateSchedule(data)) => {
                assert_eq!(data.first_time.minute.as_deref(), Some("30"));
                assert_eq!(data.first_time.hour.as_deref(), Some("2"));
                assert_eq!(data.first_time.day_of_month.as_deref(), Some("15"));
                assert!(data.first_time.year.is_none());
            }
            _ => panic!("expected completion"),
        }
    }

    #[test]
    fn minute_outside_first_time_is_unknown() {
        let mut parser = CreateScheduleParser::new();
        assert_eq!(
            parser.start_element("minute", &Attrs::default()),
            StartResult::Unknown
        );
    }
}
