//! End-to-end scenarios driving [`App`] through the mock drivers

use super::*;
use crate::calendar::DateTime;
use crate::config::{Config, ConfigItem};
use crate::constants::{
    EEPROM_SIZE, EMPTY_VALUE, END_MARKER, LOG_CELLS, SLEEP_TIMEOUT_TICKS, TICKS_PER_MINUTE,
};
use crate::input::{Button, ButtonEvent};
use crate::mocks::{MemoryEeprom, MockAudio, MockClock, MockDisplay, NoopDelay, ScriptedButtons};
use crate::sprint::Interval;
use crate::stats::Metric;
use crate::storage::{Eeprom, config_store};
use crate::wake::WakeSignal;

type TestApp<'w> =
    App<'w, MockClock, MockDisplay, MockAudio, ScriptedButtons, MemoryEeprom, NoopDelay>;

/// 2024-04-12 is day-of-year 103
fn april_12th() -> DateTime {
    DateTime::new(2024, 4, 12, 9, 0, 0)
}

/// EEPROM holding the default configuration plus the given log cells.
fn configured(cells: &[(u16, u8)]) -> MemoryEeprom {
    let mut e = Eeprom::new(MemoryEeprom::new(), NoopDelay::default());
    config_store::save(&mut e, &Config::default()).unwrap();

    let mut image = [0u8; EEPROM_SIZE];
    image.copy_from_slice(e.storage().bytes());
    for &(day, value) in cells {
        image[usize::from(day)] = value;
    }
    MemoryEeprom::from_image(&image)
}

fn booted(wake: &WakeSignal, eeprom: MemoryEeprom, now: DateTime) -> TestApp<'_> {
    let mut app = App::new(
        MockClock::new(now),
        MockDisplay::default(),
        MockAudio::default(),
        ScriptedButtons::default(),
        Eeprom::new(eeprom, NoopDelay::default()),
        wake,
    );
    app.boot();
    app
}

fn press(app: &mut TestApp<'_>, event: ButtonEvent) {
    app.buttons_mut().push(event).unwrap();
    app.tick();
}

fn short(app: &mut TestApp<'_>, button: Button) {
    press(app, ButtonEvent::Short(button));
}

fn run(app: &mut TestApp<'_>, ticks: u32) {
    for _ in 0..ticks {
        app.tick();
    }
}

fn cell(app: &TestApp<'_>, day: u16) -> u8 {
    app.eeprom().storage().bytes()[usize::from(day)]
}

fn text<'a>(app: &'a TestApp<'_>) -> &'a str {
    app.display().text.as_str()
}

const WORK_TICKS: u32 = 25 * TICKS_PER_MINUTE;

// ----------------------------------------------------------------------------
// Boot
// ----------------------------------------------------------------------------

#[test]
fn first_boot_asks_for_date_and_time() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, MemoryEeprom::new(), april_12th());
    assert!(matches!(app.state(), OperatingState::DateTimeSetup(_)));
    assert_eq!(text(&app), "2024");

    for _ in 0..5 {
        short(&mut app, Button::Ok);
    }
    assert_eq!(app.state(), OperatingState::initial());
    assert_eq!(app.snapshot().unwrap().day_of_year, 103);
    assert_eq!(text(&app), "SP 0");
}

#[test]
fn boot_fills_skipped_days_with_zero() {
    let wake = WakeSignal::new();
    let app = booted(&wake, configured(&[(100, 3), (101, END_MARKER)]), april_12th());

    assert_eq!(app.state(), OperatingState::initial());
    assert_eq!(cell(&app, 100), 3);
    assert_eq!(cell(&app, 101), 0);
    assert_eq!(cell(&app, 102), 0);
    assert_eq!(cell(&app, 103), 0);
    assert_eq!(cell(&app, 104), END_MARKER);
    assert_eq!(app.scheduler().counter(), 0);
}

#[test]
fn boot_resumes_todays_count() {
    let wake = WakeSignal::new();
    let app = booted(&wake, configured(&[(103, 5), (104, END_MARKER)]), april_12th());
    assert_eq!(app.scheduler().counter(), 5);
    assert_eq!(text(&app), "SP 5");
    assert_eq!(app.display().leds, 0b0001);
}

#[test]
fn halted_clock_recovers_through_setup() {
    let wake = WakeSignal::new();
    let mut clock_reading = april_12th();
    clock_reading.second = 30;
    let mut app = App::new(
        MockClock {
            now: clock_reading,
            halted: true,
        },
        MockDisplay::default(),
        MockAudio::default(),
        ScriptedButtons::default(),
        Eeprom::new(configured(&[]), NoopDelay::default()),
        &wake,
    );
    app.boot();
    assert_eq!(app.state(), OperatingState::Error(AppError::ClockHalted));
    assert_eq!(app.display().text.as_str(), "Er 1");

    // Only the documented gesture does anything
    app.buttons_mut().push(ButtonEvent::Short(Button::Switch)).unwrap();
    app.tick();
    assert_eq!(app.state(), OperatingState::Error(AppError::ClockHalted));

    app.buttons_mut().push(ButtonEvent::Short(Button::Ok)).unwrap();
    app.tick();
    assert!(matches!(app.state(), OperatingState::DateTimeSetup(_)));
    for _ in 0..5 {
        app.buttons_mut().push(ButtonEvent::Short(Button::Ok)).unwrap();
        app.tick();
    }
    assert_eq!(app.state(), OperatingState::initial());
    assert!(!app.clock().halted);
    assert_eq!(app.clock().now.second, 0);
}

#[test]
fn insane_clock_is_fatal() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[]), DateTime::new(2150, 1, 1, 0, 0, 0));
    assert_eq!(app.state(), OperatingState::Error(AppError::ClockInsane));
    assert_eq!(text(&app), "Er 2");

    short(&mut app, Button::Ok);
    match app.state() {
        OperatingState::DateTimeSetup(setup) => assert!(setup.draft.is_sane()),
        other => panic!("unexpected state {:?}", other),
    }
}

#[test]
fn uncleared_log_needs_long_ok_to_clear() {
    let wake = WakeSignal::new();
    let mut app = booted(
        &wake,
        configured(&[(103, 1), (104, END_MARKER), (105, 4)]),
        april_12th(),
    );
    assert_eq!(app.state(), OperatingState::Error(AppError::UnclearedLog));
    assert_eq!(text(&app), "Er 3");

    short(&mut app, Button::Ok);
    assert_eq!(app.state(), OperatingState::Error(AppError::UnclearedLog));

    press(&mut app, ButtonEvent::LongStart(Button::Ok));
    press(&mut app, ButtonEvent::LongRelease(Button::Ok));
    assert_eq!(app.state(), OperatingState::initial());
    assert!((0..LOG_CELLS as u16).all(|d| cell(&app, d) == EMPTY_VALUE));
    assert_eq!(app.scheduler().counter(), 0);
}

// ----------------------------------------------------------------------------
// Sprints
// ----------------------------------------------------------------------------

#[test]
fn completed_sprint_is_saved_and_announced() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[]), april_12th());

    short(&mut app, Button::Ok);
    assert_eq!(app.state(), OperatingState::Counting { armed: None });
    assert_eq!(text(&app), "25:00");
    assert_eq!(app.display().blinking_leds, 0b0001);

    run(&mut app, 10);
    assert_eq!(text(&app), "24:59");

    run(&mut app, WORK_TICKS - 10);
    assert_eq!(app.scheduler().counter(), 1);
    assert_eq!(app.scheduler().interval(), Interval::ShortBreak);
    assert_eq!(cell(&app, 103), 1);
    assert_eq!(cell(&app, 104), END_MARKER);
    // Default tune is the first cue
    assert_eq!(app.audio().tones.len(), 4);
    assert_eq!(app.display().leds, 0b0001);
    assert_eq!(app.display().blinking_leds, 0);
}

#[test]
fn break_finishes_into_next_work_interval() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[(103, 3), (104, END_MARKER)]), april_12th());

    short(&mut app, Button::Ok);
    run(&mut app, WORK_TICKS);
    assert_eq!(app.scheduler().counter(), 4);
    assert_eq!(app.scheduler().interval(), Interval::LongBreak);
    assert_eq!(app.display().leds, 0b1111);

    run(&mut app, 15 * TICKS_PER_MINUTE);
    assert_eq!(app.scheduler().interval(), Interval::Work);
    assert_eq!(app.scheduler().remaining(), (25, 0));
    assert_eq!(app.audio().beeps, 1);
}

#[test]
fn one_click_hero_takes_effect_on_release() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[]), april_12th());
    short(&mut app, Button::Ok);

    press(&mut app, ButtonEvent::LongStart(Button::Ok));
    assert_eq!(app.state(), OperatingState::Counting { armed: Some(Button::Ok) });
    assert!(!app.one_click().hero);
    press(&mut app, ButtonEvent::LongRelease(Button::Ok));
    assert!(app.one_click().hero);
    assert_eq!(app.state(), OperatingState::Counting { armed: None });

    run(&mut app, WORK_TICKS - 2);
    assert_eq!(app.scheduler().interval(), Interval::ShortBreak);
    assert_eq!(app.scheduler().remaining(), (0, 1));
    run(&mut app, 10);
    assert_eq!(app.scheduler().interval(), Interval::Work);

    // Never persisted
    assert!(!app.config().hero_mode);
}

#[test]
fn one_click_mute_silences_completion() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[]), april_12th());
    short(&mut app, Button::Ok);

    press(&mut app, ButtonEvent::LongStart(Button::Back));
    press(&mut app, ButtonEvent::LongRelease(Button::Back));
    assert!(app.config().mute);

    run(&mut app, WORK_TICKS);
    assert_eq!(app.scheduler().counter(), 1);
    assert!(app.audio().tones.is_empty());
    assert_eq!(app.audio().beeps, 0);
}

#[test]
fn pause_resume_and_stop() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[]), april_12th());
    short(&mut app, Button::Ok);
    run(&mut app, 30);

    short(&mut app, Button::Ok);
    assert_eq!(app.state(), OperatingState::Paused);
    assert_eq!(text(&app), "24:57");
    assert_eq!(app.display().blinking_digits, 0b1111);

    // Reminder every minute while paused
    run(&mut app, TICKS_PER_MINUTE);
    assert_eq!(app.audio().beeps, 2);
    assert_eq!(text(&app), "24:57");

    short(&mut app, Button::Ok);
    assert_eq!(app.state(), OperatingState::Counting { armed: None });
    short(&mut app, Button::Ok);
    assert_eq!(app.state(), OperatingState::Paused);

    press(&mut app, ButtonEvent::LongStart(Button::Back));
    assert_eq!(app.state(), OperatingState::Paused);
    press(&mut app, ButtonEvent::LongRelease(Button::Back));
    assert_eq!(app.state(), OperatingState::initial());
    assert_eq!(app.scheduler().interval(), Interval::Idle);
    assert_eq!(cell(&app, 103), EMPTY_VALUE);
}

// ----------------------------------------------------------------------------
// Menus
// ----------------------------------------------------------------------------

#[test]
fn statistics_menu_shows_values() {
    let wake = WakeSignal::new();
    let mut app = booted(
        &wake,
        configured(&[(101, 2), (102, 3), (103, END_MARKER)]),
        april_12th(),
    );

    short(&mut app, Button::Switch);
    assert_eq!(text(&app), "StAt");
    short(&mut app, Button::Ok);
    assert_eq!(
        app.state(),
        OperatingState::Standby(MenuState::StatsSelect(StatsItem::Metric(Metric::Total)))
    );
    assert_eq!(text(&app), "tOtL");

    short(&mut app, Button::Ok);
    assert_eq!(text(&app), "  7d");
    short(&mut app, Button::Ok);
    assert_eq!(text(&app), "  5.0");

    // Back to the metric list, on to the average
    short(&mut app, Button::Back);
    short(&mut app, Button::Back);
    short(&mut app, Button::Switch);
    short(&mut app, Button::Switch);
    assert_eq!(text(&app), " AVG");
    short(&mut app, Button::Ok);
    short(&mut app, Button::Ok);
    assert_eq!(text(&app), "  2.5");

    short(&mut app, Button::Back);
    short(&mut app, Button::Back);
    short(&mut app, Button::Back);
    assert_eq!(app.state(), OperatingState::Standby(MenuState::Main(MainItem::Statistics)));
}

#[test]
fn config_edit_saves_and_cancels() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[]), april_12th());

    short(&mut app, Button::Switch);
    short(&mut app, Button::Switch);
    short(&mut app, Button::Ok);
    assert_eq!(
        app.state(),
        OperatingState::Standby(MenuState::ConfigSelect(ConfigItem::Brightness))
    );
    short(&mut app, Button::Switch);
    assert_eq!(text(&app), "bUZZ");
    short(&mut app, Button::Ok);
    assert_eq!(text(&app), " On ");
    short(&mut app, Button::Switch);
    assert_eq!(text(&app), " OFF");
    short(&mut app, Button::Ok);
    assert!(!app.config().buzzer);

    let mut reread = Eeprom::new(
        MemoryEeprom::from_image(app.eeprom().storage().bytes()),
        NoopDelay::default(),
    );
    assert!(!config_store::load(&mut reread).unwrap().0.buzzer);

    // Edit again, then cancel
    short(&mut app, Button::Ok);
    short(&mut app, Button::Switch);
    assert!(app.config().buzzer);
    short(&mut app, Button::Back);
    assert!(!app.config().buzzer);
    assert_eq!(
        app.state(),
        OperatingState::Standby(MenuState::ConfigSelect(ConfigItem::Buzzer))
    );
}

#[test]
fn brightness_edit_applies_immediately() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[]), april_12th());
    assert_eq!(app.display().brightness, 2);

    short(&mut app, Button::Switch);
    short(&mut app, Button::Switch);
    short(&mut app, Button::Ok);
    short(&mut app, Button::Ok);
    short(&mut app, Button::Switch);
    assert_eq!(app.display().brightness, 3);
    short(&mut app, Button::Back);
    assert_eq!(app.display().brightness, 2);
}

#[test]
fn clear_from_statistics_menu() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[(103, 2), (104, END_MARKER)]), april_12th());

    short(&mut app, Button::Switch);
    short(&mut app, Button::Ok);
    for _ in 0..4 {
        short(&mut app, Button::Switch);
    }
    assert_eq!(text(&app), " CLr");
    short(&mut app, Button::Ok);
    assert_eq!(app.state(), OperatingState::Clearing);

    // Back leaves the log alone
    short(&mut app, Button::Back);
    assert_eq!(cell(&app, 103), 2);
    short(&mut app, Button::Ok);

    press(&mut app, ButtonEvent::LongStart(Button::Ok));
    press(&mut app, ButtonEvent::LongRelease(Button::Ok));
    assert_eq!(app.state(), OperatingState::initial());
    assert_eq!(cell(&app, 103), EMPTY_VALUE);
    assert_eq!(cell(&app, 104), EMPTY_VALUE);
    assert_eq!(app.scheduler().counter(), 0);
}

#[test]
fn setting_clock_back_drops_stale_marker() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[(103, 2), (104, END_MARKER)]), april_12th());

    short(&mut app, Button::Back);
    assert_eq!(text(&app), "CLOC");
    short(&mut app, Button::Ok);
    short(&mut app, Button::Ok);
    short(&mut app, Button::Ok);
    // Day 12 -> 11
    short(&mut app, Button::Back);
    short(&mut app, Button::Ok);
    short(&mut app, Button::Ok);
    short(&mut app, Button::Ok);

    assert_eq!(app.state(), OperatingState::initial());
    assert_eq!(app.snapshot().unwrap().day_of_year, 102);
    assert_eq!(cell(&app, 104), EMPTY_VALUE);
    assert_eq!(app.scheduler().counter(), 0);
}

// ----------------------------------------------------------------------------
// Background behaviour
// ----------------------------------------------------------------------------

#[test]
fn idle_standby_sleeps_and_wakes_on_signal() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[]), april_12th());

    run(&mut app, SLEEP_TIMEOUT_TICKS - 1);
    assert_eq!(app.state(), OperatingState::initial());
    run(&mut app, 1);
    assert_eq!(app.state(), OperatingState::Sleeping);
    assert_eq!(text(&app), "");

    run(&mut app, 50);
    assert_eq!(app.state(), OperatingState::Sleeping);

    wake.notify();
    app.tick();
    assert_eq!(app.state(), OperatingState::initial());
    assert_eq!(text(&app), "SP 0");
}

#[test]
fn button_press_resets_idle_timer() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[]), april_12th());

    run(&mut app, SLEEP_TIMEOUT_TICKS - 10);
    short(&mut app, Button::Switch);
    run(&mut app, 20);
    assert!(matches!(app.state(), OperatingState::Standby(_)));
}

#[test]
fn standby_notices_day_rollover() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[(103, 2), (104, END_MARKER)]), april_12th());
    assert_eq!(app.scheduler().counter(), 2);

    app.clock_mut().now = DateTime::new(2024, 4, 13, 0, 0, 5);
    run(&mut app, TICKS_PER_MINUTE);

    assert_eq!(app.snapshot().unwrap().day_of_year, 104);
    assert_eq!(app.scheduler().counter(), 0);
    assert_eq!(cell(&app, 103), 2);
    assert_eq!(cell(&app, 104), 0);
    assert_eq!(cell(&app, 105), END_MARKER);
}

#[test]
fn sprint_finishing_after_midnight_counts_for_new_day() {
    let wake = WakeSignal::new();
    let mut app = booted(&wake, configured(&[(103, 2), (104, END_MARKER)]), april_12th());
    short(&mut app, Button::Ok);

    app.clock_mut().now = DateTime::new(2024, 4, 13, 0, 10, 0);
    run(&mut app, WORK_TICKS);

    assert_eq!(app.scheduler().counter(), 1);
    assert_eq!(cell(&app, 103), 2);
    assert_eq!(cell(&app, 104), 1);
    assert_eq!(cell(&app, 105), END_MARKER);
}
