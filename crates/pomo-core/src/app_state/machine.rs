//! The operating state machine.
//!
//! [`App`] is the single application context: it owns the collaborator
//! drivers, the EEPROM, the configuration, the calendar snapshot and the
//! statistics table, and is advanced by calling [`App::tick`] once per
//! 100 ms main-loop iteration. Each tick polls at most one button event and
//! advances exactly one step.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use embedded_storage::Storage;
use log::{debug, error, info, warn};

use super::clock_setup::ClockSetup;
use super::menu::{MainItem, MenuState, StatsItem, next_period};
use super::{AppError, OperatingState};
use crate::calendar::{CalendarSnapshot, DateTime};
use crate::config::{Config, ConfigItem};
use crate::constants::{ALL_DIGITS, SLEEP_TIMEOUT_TICKS, TICKS_PER_MINUTE};
use crate::cues::{self, Xorshift};
use crate::display::{Frame, Screen, format_countdown, format_error, format_stat};
use crate::drivers::{AudioDriver, ButtonSource, ClockDriver, DisplayDriver};
use crate::input::{Button, ButtonEvent};
use crate::sprint::{Interval, LedPattern, OneClickModes, SprintEvent, SprintScheduler, led_pattern};
use crate::stats::{self, Metric, Period, StatsTable};
use crate::storage::{ConfigLoad, CounterLog, Eeprom, config_store};
use crate::wake::WakeSignal;

fn rng_seed(now: &DateTime) -> u32 {
    (u32::from(now.second)
        | u32::from(now.minute) << 8
        | u32::from(now.hour) << 16
        | u32::from(now.day) << 24)
        ^ u32::from(now.year)
}

pub struct App<'w, C, V, A, B, S, D>
where
    C: ClockDriver,
    V: DisplayDriver,
    A: AudioDriver,
    B: ButtonSource,
    S: Storage,
    S::Error: core::fmt::Debug,
    D: DelayNs,
{
    clock: C,
    screen: Screen<V>,
    audio: A,
    buttons: B,
    eeprom: Eeprom<S, D>,
    wake: &'w WakeSignal,
    state: OperatingState,
    config: Config,
    one_click: OneClickModes,
    scheduler: SprintScheduler,
    snapshot: Option<CalendarSnapshot>,
    stats: StatsTable,
    rng: Xorshift,
    idle_ticks: u32,
    minute_ticks: u32,
}

impl<'w, C, V, A, B, S, D> App<'w, C, V, A, B, S, D>
where
    C: ClockDriver,
    V: DisplayDriver,
    A: AudioDriver,
    B: ButtonSource,
    S: Storage,
    S::Error: core::fmt::Debug,
    D: DelayNs,
{
    /// Wires up the drivers. Nothing is read until [`App::boot`].
    pub fn new(
        clock: C,
        display: V,
        audio: A,
        buttons: B,
        eeprom: Eeprom<S, D>,
        wake: &'w WakeSignal,
    ) -> Self {
        Self {
            clock,
            screen: Screen::new(display),
            audio,
            buttons,
            eeprom,
            wake,
            state: OperatingState::initial(),
            config: Config::default(),
            one_click: OneClickModes::default(),
            scheduler: SprintScheduler::new(),
            snapshot: None,
            stats: StatsTable::default(),
            rng: Xorshift::new(0),
            idle_ticks: 0,
            minute_ticks: 0,
        }
    }

    pub fn state(&self) -> OperatingState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn one_click(&self) -> OneClickModes {
        self.one_click
    }

    pub fn scheduler(&self) -> &SprintScheduler {
        &self.scheduler
    }

    pub fn snapshot(&self) -> Option<CalendarSnapshot> {
        self.snapshot
    }

    pub fn stats(&self) -> &StatsTable {
        &self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn display(&self) -> &V {
        self.screen.driver()
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn buttons_mut(&mut self) -> &mut B {
        &mut self.buttons
    }

    pub fn eeprom(&self) -> &Eeprom<S, D> {
        &self.eeprom
    }

    /// Power-up sequence: load the configuration, check the clock and bring
    /// the counter log up to date. Ends in Standby, DateTimeSetup or Error.
    pub fn boot(&mut self) {
        info!("Booting");
        self.scheduler = SprintScheduler::new();
        self.one_click = OneClickModes::default();
        self.snapshot = None;

        match self.try_boot() {
            Ok(state) => self.enter(state),
            Err(e) => self.fail(e),
        }
        self.screen.mark_dirty();
        self.render();
    }

    fn try_boot(&mut self) -> Result<OperatingState, AppError> {
        let (config, outcome) = config_store::load(&mut self.eeprom)?;
        self.config = config;
        self.apply_brightness();

        let now = self.clock.read();
        self.rng = Xorshift::new(rng_seed(&now));

        if outcome == ConfigLoad::Fresh {
            info!("First power-up, asking for date and time");
            return Ok(OperatingState::DateTimeSetup(ClockSetup::new(now)));
        }
        if self.clock.is_halted() {
            return Err(AppError::ClockHalted);
        }

        let snapshot = CalendarSnapshot::from_datetime(&now)?;
        self.load_day(snapshot, false)?;
        Ok(OperatingState::initial())
    }

    /// Reconciles the log for `snapshot`'s day and loads its count.
    ///
    /// With `clock_changed` set, a marker left ahead of the new date by a
    /// backwards clock change is dropped first.
    fn load_day(&mut self, snapshot: CalendarSnapshot, clock_changed: bool) -> Result<(), AppError> {
        let today = snapshot.day_of_year;
        let mut log = CounterLog::new(&mut self.eeprom);
        let count = if clock_changed {
            log.repair_after_clock_change(today, snapshot.year)?
        } else {
            log.reconcile_on_boot(today, snapshot.year)?
        };
        log.validate_boundary(today)?;

        info!(
            "Day {} of {} (weekday {}), {} sprints so far",
            today, snapshot.year, snapshot.day_of_week, count
        );
        self.scheduler.set_counter(count);
        self.snapshot = Some(snapshot);
        Ok(())
    }

    /// Re-reads the clock, handling a day change since the last reading.
    fn refresh_calendar(&mut self) -> Result<CalendarSnapshot, AppError> {
        if self.clock.is_halted() {
            return Err(AppError::ClockHalted);
        }
        let snapshot = CalendarSnapshot::from_datetime(&self.clock.read())?;
        let day_changed = self
            .snapshot
            .is_none_or(|old| old.day_of_year != snapshot.day_of_year || old.year != snapshot.year);
        if day_changed {
            info!("Day rolled over to {} of {}", snapshot.day_of_year, snapshot.year);
            self.load_day(snapshot, false)?;
        }
        Ok(snapshot)
    }

    fn enter(&mut self, state: OperatingState) {
        if core::mem::discriminant(&state) != core::mem::discriminant(&self.state) {
            debug!("State {:?} -> {:?}", self.state, state);
        }
        match state {
            OperatingState::Standby(_) if !matches!(self.state, OperatingState::Standby(_)) => {
                self.idle_ticks = 0;
                self.minute_ticks = 0;
            }
            OperatingState::Sleeping => {
                // Drop a wake-up raised before we went to sleep
                self.wake.take();
            }
            _ => {}
        }
        self.state = state;
    }

    fn fail(&mut self, error: AppError) {
        error!("Fault Er {}: {}", error.code(), error);
        self.scheduler.reset();
        self.enter(OperatingState::Error(error));
    }

    /// One main-loop step.
    pub fn tick(&mut self) {
        let event = self.buttons.poll();
        if let Some(event) = event {
            debug!("Button {:?}", event);
            self.idle_ticks = 0;
        }

        let result = match self.state {
            OperatingState::Standby(menu) => self.tick_standby(menu, event),
            OperatingState::Counting { armed } => self.tick_counting(armed, event),
            OperatingState::Paused => self.tick_paused(event),
            OperatingState::Sleeping => self.tick_sleeping(event),
            OperatingState::DateTimeSetup(setup) => self.tick_clock_setup(setup, event),
            OperatingState::Clearing => self.tick_clearing(event),
            OperatingState::Error(error) => {
                self.tick_error(error, event);
                Ok(())
            }
        };
        if let Err(e) = result {
            self.fail(e);
        }

        self.render();
    }

    // ------------------------------------------------------------------
    // Standby and menus
    // ------------------------------------------------------------------

    fn tick_standby(&mut self, menu: MenuState, event: Option<ButtonEvent>) -> Result<(), AppError> {
        self.minute_ticks += 1;
        if self.minute_ticks >= TICKS_PER_MINUTE {
            self.minute_ticks = 0;
            self.refresh_calendar()?;
        }

        match event {
            Some(ButtonEvent::Short(button)) => self.navigate(menu, button),
            Some(_) => Ok(()),
            None => {
                self.idle_ticks += 1;
                if self.idle_ticks >= SLEEP_TIMEOUT_TICKS {
                    info!("No activity, going to sleep");
                    self.enter(OperatingState::Sleeping);
                }
                Ok(())
            }
        }
    }

    fn navigate(&mut self, menu: MenuState, button: Button) -> Result<(), AppError> {
        use MenuState::*;

        let next = match (menu, button) {
            (Main(item), Button::Switch) => Main(item.next()),
            (Main(item), Button::Back) => Main(item.previous()),
            (Main(MainItem::Sprint), Button::Ok) => {
                if self.scheduler.start() {
                    self.enter(OperatingState::Counting { armed: None });
                }
                return Ok(());
            }
            (Main(MainItem::Statistics), Button::Ok) => {
                self.refresh_stats()?;
                StatsSelect(StatsItem::Metric(Metric::Total))
            }
            (Main(MainItem::Config), Button::Ok) => ConfigSelect(ConfigItem::Brightness),
            (Main(MainItem::Clock), Button::Ok) => {
                let setup = ClockSetup::new(self.clock.read());
                self.enter(OperatingState::DateTimeSetup(setup));
                return Ok(());
            }

            (StatsSelect(item), Button::Switch) => StatsSelect(item.next()),
            (StatsSelect(_), Button::Back) => Main(MainItem::Statistics),
            (StatsSelect(StatsItem::Metric(metric)), Button::Ok) => StatsPeriod {
                metric,
                period: Period::Rolling(7),
            },
            (StatsSelect(StatsItem::Clear), Button::Ok) => {
                self.enter(OperatingState::Clearing);
                return Ok(());
            }

            (StatsPeriod { metric, period }, Button::Switch) => StatsPeriod {
                metric,
                period: next_period(period, self.current_month()),
            },
            (StatsPeriod { metric, .. }, Button::Back) => StatsSelect(StatsItem::Metric(metric)),
            (StatsPeriod { metric, period }, Button::Ok) => StatsValue { metric, period },

            (StatsValue { metric, period }, Button::Switch) => StatsValue {
                metric,
                period: next_period(period, self.current_month()),
            },
            (StatsValue { metric, period }, Button::Back | Button::Ok) => {
                StatsPeriod { metric, period }
            }

            (ConfigSelect(item), Button::Switch) => ConfigSelect(item.next()),
            (ConfigSelect(_), Button::Back) => Main(MainItem::Config),
            (ConfigSelect(item), Button::Ok) => ConfigEdit(item),

            (ConfigEdit(item), Button::Switch) => {
                self.config.cycle(item);
                self.apply_brightness();
                ConfigEdit(item)
            }
            (ConfigEdit(item), Button::Ok) => {
                config_store::save(&mut self.eeprom, &self.config)?;
                info!("Saved {} = {}", item.label(), self.config.value_text(item).as_str());
                ConfigSelect(item)
            }
            (ConfigEdit(item), Button::Back) => {
                self.revert_config()?;
                ConfigSelect(item)
            }
        };

        self.enter(OperatingState::Standby(next));
        Ok(())
    }

    fn current_month(&self) -> u8 {
        self.snapshot.map_or(0, |s| s.month)
    }

    fn refresh_stats(&mut self) -> Result<(), AppError> {
        let snapshot = self.refresh_calendar()?;
        let mut log = CounterLog::new(&mut self.eeprom);
        self.stats = stats::compute_all(
            &mut log,
            &snapshot,
            self.config.counting_days,
            self.config.unit,
        )?;
        debug!("Statistics recomputed for day {}", snapshot.day_of_year);
        Ok(())
    }

    /// Discards unsaved edits by reloading the stored record.
    fn revert_config(&mut self) -> Result<(), AppError> {
        let mute = self.config.mute;
        let (config, _) = config_store::load(&mut self.eeprom)?;
        self.config = Config { mute, ..config };
        self.apply_brightness();
        debug!("Configuration edits discarded");
        Ok(())
    }

    fn apply_brightness(&mut self) {
        self.screen.set_brightness(self.config.brightness.level());
    }

    // ------------------------------------------------------------------
    // Counting and paused
    // ------------------------------------------------------------------

    fn tick_counting(&mut self, armed: Option<Button>, event: Option<ButtonEvent>) -> Result<(), AppError> {
        let mut armed = armed;
        match event {
            Some(ButtonEvent::Short(Button::Ok)) if self.scheduler.pause() => {
                self.enter(OperatingState::Paused);
                return Ok(());
            }
            Some(ButtonEvent::LongStart(button)) => armed = Some(button),
            Some(ButtonEvent::LongRelease(button)) => {
                if armed == Some(button) {
                    self.toggle_one_click(button);
                }
                armed = None;
            }
            _ => {}
        }
        self.state = OperatingState::Counting { armed };

        match self.scheduler.tick() {
            Some(SprintEvent::WorkFinished) => self.finish_sprint(),
            Some(SprintEvent::BreakFinished) => {
                if self.audible() {
                    self.audio.beep(300, 0, 1);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn toggle_one_click(&mut self, button: Button) {
        match button {
            Button::Back => {
                self.config.mute = !self.config.mute;
                info!("Mute {}", self.config.mute);
            }
            Button::Switch => {
                self.one_click.melody_off = !self.one_click.melody_off;
                info!("Melody off {}", self.one_click.melody_off);
            }
            Button::Ok => {
                self.one_click.hero = !self.one_click.hero;
                info!("Hero override {}", self.one_click.hero);
            }
        }
    }

    fn audible(&self) -> bool {
        self.config.buzzer && !self.config.mute
    }

    fn finish_sprint(&mut self) -> Result<(), AppError> {
        // A sprint ending after midnight counts for the new day
        let snapshot = self.refresh_calendar()?;
        let hero = self.config.hero_mode != self.one_click.hero;
        let count = self.scheduler.complete_sprint(hero);
        CounterLog::new(&mut self.eeprom).write_count(snapshot.day_of_year, count)?;
        self.play_completion_cue();
        Ok(())
    }

    fn play_completion_cue(&mut self) {
        if !self.audible() {
            return;
        }
        let notes = if self.one_click.melody_off {
            None
        } else {
            cues::select(self.config.tune, &mut self.rng)
        };
        match notes {
            Some(notes) => {
                for &(freq_hz, duration_ms) in notes {
                    self.audio.play_tone(freq_hz, duration_ms);
                }
            }
            None => self.audio.beep(150, 100, 3),
        }
    }

    fn tick_paused(&mut self, event: Option<ButtonEvent>) -> Result<(), AppError> {
        match event {
            Some(ButtonEvent::Short(Button::Ok)) => {
                self.scheduler.resume();
                self.enter(OperatingState::Counting { armed: None });
                return Ok(());
            }
            Some(ButtonEvent::LongRelease(Button::Back)) => {
                self.scheduler.cancel();
                self.enter(OperatingState::initial());
                return Ok(());
            }
            _ => {}
        }

        if self.scheduler.tick() == Some(SprintEvent::PauseReminder)
            && self.config.pause_reminder
            && self.audible()
        {
            debug!("Pause reminder");
            self.audio.beep(60, 60, 2);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sleeping, clock setup, clearing, errors
    // ------------------------------------------------------------------

    fn tick_sleeping(&mut self, event: Option<ButtonEvent>) -> Result<(), AppError> {
        if event.is_none() && !self.wake.take() {
            return Ok(());
        }
        info!("Waking up");
        self.screen.mark_dirty();
        self.refresh_calendar()?;
        self.enter(OperatingState::initial());
        Ok(())
    }

    fn tick_clock_setup(&mut self, setup: ClockSetup, event: Option<ButtonEvent>) -> Result<(), AppError> {
        let Some(ButtonEvent::Short(button)) = event else {
            return Ok(());
        };
        let mut setup = setup;
        match button {
            Button::Switch => setup.adjust(true),
            Button::Back => setup.adjust(false),
            Button::Ok => {
                if !setup.advance() {
                    return self.commit_clock(setup.draft);
                }
            }
        }
        self.state = OperatingState::DateTimeSetup(setup);
        Ok(())
    }

    fn commit_clock(&mut self, draft: DateTime) -> Result<(), AppError> {
        info!(
            "Clock set to {}-{:02}-{:02} {:02}:{:02}",
            draft.year, draft.month, draft.day, draft.hour, draft.minute
        );
        self.clock.write(&draft);
        if self.clock.is_halted() {
            return Err(AppError::ClockHalted);
        }
        let snapshot = CalendarSnapshot::from_datetime(&self.clock.read())?;
        self.load_day(snapshot, true)?;
        self.enter(OperatingState::initial());
        Ok(())
    }

    fn tick_clearing(&mut self, event: Option<ButtonEvent>) -> Result<(), AppError> {
        match event {
            Some(ButtonEvent::LongRelease(Button::Ok)) => self.clear_statistics(),
            Some(ButtonEvent::Short(Button::Back)) => {
                self.enter(OperatingState::Standby(MenuState::StatsSelect(StatsItem::Clear)));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn clear_statistics(&mut self) -> Result<(), AppError> {
        CounterLog::new(&mut self.eeprom).clear_all()?;
        self.snapshot = None;
        self.scheduler.set_counter(0);
        self.refresh_calendar()?;
        self.enter(OperatingState::initial());
        Ok(())
    }

    fn tick_error(&mut self, error: AppError, event: Option<ButtonEvent>) {
        match (error, event) {
            (e, Some(ButtonEvent::Short(Button::Ok))) if e.is_clock_fault() => {
                let setup = ClockSetup::new(self.clock.read());
                self.enter(OperatingState::DateTimeSetup(setup));
            }
            (AppError::UnclearedLog, Some(ButtonEvent::LongRelease(Button::Ok))) => {
                warn!("Clearing statistics to recover");
                if let Err(e) = self.clear_statistics() {
                    self.fail(e);
                }
            }
            (AppError::Storage, Some(ButtonEvent::Short(Button::Ok))) => self.boot(),
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn progress(&self, interval: Interval) -> LedPattern {
        if self.config.progress_leds {
            led_pattern(self.scheduler.counter(), interval)
        } else {
            LedPattern::default()
        }
    }

    fn frame(&self) -> Frame {
        match self.state {
            OperatingState::Standby(menu) => self.menu_frame(menu),
            OperatingState::Counting { armed } => {
                let (minutes, seconds) = self.scheduler.remaining();
                Frame {
                    text: format_countdown(minutes, seconds),
                    leds: self.progress(self.scheduler.interval()),
                    blink_digits: if armed.is_some() { ALL_DIGITS } else { 0 },
                }
            }
            OperatingState::Paused => {
                let (minutes, seconds) = self.scheduler.remaining();
                Frame {
                    text: format_countdown(minutes, seconds),
                    leds: self.progress(self.scheduler.interval()),
                    blink_digits: ALL_DIGITS,
                }
            }
            OperatingState::Sleeping => Frame::default(),
            OperatingState::DateTimeSetup(setup) => {
                let (text, blink_digits) = setup.render();
                Frame {
                    text,
                    blink_digits,
                    ..Frame::default()
                }
            }
            OperatingState::Clearing => Frame::text("CLr?").blinking(ALL_DIGITS),
            OperatingState::Error(error) => Frame {
                text: format_error(error),
                ..Frame::default()
            },
        }
    }

    fn menu_frame(&self, menu: MenuState) -> Frame {
        match menu {
            MenuState::Main(MainItem::Sprint) => {
                let mut frame = Frame::default().with_leds(self.progress(Interval::Idle));
                write!(frame.text, "SP{:>2}", self.scheduler.counter()).ok();
                frame
            }
            MenuState::Main(item) => Frame::text(item.label()),
            MenuState::StatsSelect(item) => Frame::text(item.label()),
            MenuState::StatsPeriod { period, .. } => Frame::text(period.label()),
            MenuState::StatsValue { metric, period } => Frame {
                text: format_stat(self.stats.get(metric, period)),
                ..Frame::default()
            },
            MenuState::ConfigSelect(item) => Frame::text(item.label()),
            MenuState::ConfigEdit(item) => Frame {
                text: self.config.value_text(item),
                blink_digits: ALL_DIGITS,
                ..Frame::default()
            },
        }
    }

    fn render(&mut self) {
        let frame = self.frame();
        self.screen.present(&frame);
    }
}
