use chrono::{DateTime, NaiveDate, Utc};
use core::time::Duration;
use rand::rngs::SmallRng;
use web_time::Instant;

use crate::*;

/// What a gender selection resolves to once its delay has passed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Deferred {
    ToFinalQuestion,
    Reset,
}

/// Read-only snapshot of everything a presentation layer needs to draw the active screen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowState {
    screen: Screen,
    declined: bool,
    verification_input: String,
    gate: Option<Countdown>,
    gate_remaining: Duration,
    gate_open: bool,
    decoy: DecoyPosition,
    math_input: String,
    wrong_attempt: bool,
    gender: Gender,
    game: Option<RevealGame>,
}

impl FlowState {
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Set once the initial screen was declined, until the next reset.
    pub fn declined(&self) -> bool {
        self.declined
    }

    pub fn verification_input(&self) -> &str {
        &self.verification_input
    }

    pub fn gate_deadline(&self) -> Option<Instant> {
        self.gate.map(|gate| gate.deadline())
    }

    pub fn gate_remaining(&self) -> Duration {
        self.gate_remaining
    }

    pub fn gate_seconds_left(&self) -> u64 {
        whole_seconds_left(self.gate_remaining)
    }

    pub fn gate_open(&self) -> bool {
        self.gate_open
    }

    pub fn decoy(&self) -> DecoyPosition {
        self.decoy
    }

    pub fn math_input(&self) -> &str {
        &self.math_input
    }

    pub fn wrong_attempt(&self) -> bool {
        self.wrong_attempt
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn game(&self) -> Option<&RevealGame> {
        self.game.as_ref()
    }
}

/// Owns the screen state machine. Every inbound event is one method; methods that do not
/// apply to the active screen return an error and leave the state untouched.
#[derive(Debug)]
pub struct FlowController<N = LogNotifier> {
    config: FlowConfig,
    token: String,
    rng: SmallRng,
    state: FlowState,
    pending: Option<Scheduled<Deferred>>,
    notifier: N,
}

impl FlowController<LogNotifier> {
    pub fn new(config: FlowConfig) -> Self {
        Self::with_notifier(config, LogNotifier)
    }
}

impl<N: Notifier> FlowController<N> {
    pub fn with_notifier(config: FlowConfig, notifier: N) -> Self {
        use rand::prelude::*;

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let token = match &config.token {
            Some(token) => token.clone(),
            None => generate_token(&mut rng, config.token_len),
        };

        Self {
            config,
            token,
            rng,
            state: FlowState::default(),
            pending: None,
            notifier,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen
    }

    /// Session verification token, fixed for the lifetime of the controller.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// The only date offered on the date screen.
    pub fn offered_date(&self) -> NaiveDate {
        self.config.date
    }

    pub fn pending_response(&self) -> Option<Deferred> {
        self.pending.map(|task| task.action())
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn start(&mut self) {
        if let Some(task) = self.pending.take() {
            log::debug!("cancelled pending {:?}", task.action());
        }
        self.state = FlowState::default();
        log::debug!("flow reset to {}", Screen::Initial);
    }

    pub fn accept_initial(&mut self) -> Result<Screen> {
        self.check_screen("accept", Screen::Initial)?;
        Ok(self.transition(Screen::DateSelect))
    }

    pub fn decline_initial(&mut self) -> Result<Screen> {
        self.check_screen("decline", Screen::Initial)?;
        self.state.declined = true;
        Ok(self.transition(Screen::Verify))
    }

    pub fn submit_verification(&mut self, input: &str, now: Instant) -> Result<Verification> {
        self.check_screen("submit verification", Screen::Verify)?;
        self.state.verification_input = input.to_owned();

        if input != self.token {
            log::debug!("verification rejected");
            return Ok(Verification::Rejected);
        }

        self.transition(Screen::ConfirmPending);
        self.state.gate = Some(Countdown::arm(now, self.config.gate_delay()));
        self.update_gate(now);
        Ok(Verification::Accepted)
    }

    /// Advances the clock-driven parts of the flow, meant to be called at a fine cadence.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if let Some(task) = self.pending {
            if task.keyed_to() == self.state.screen && task.is_due(now) {
                self.pending = None;
                return TickOutcome::Fired(self.fire(task.action()));
            }
        }

        if self.state.screen == Screen::ConfirmPending {
            self.update_gate(now)
        } else {
            TickOutcome::Idle
        }
    }

    /// Always permitted on its screen, the gate only drives which control the caller enables.
    pub fn confirm_after_gate(&mut self) -> Result<Screen> {
        self.check_screen("confirm", Screen::ConfirmPending)?;
        self.transition(Screen::RevealGame);
        self.state.game = Some(self.new_board());
        Ok(Screen::RevealGame)
    }

    pub fn reveal(&mut self, id: CellId) -> Result<RevealOutcome> {
        let game = self.current_game_mut("reveal")?;
        let outcome = game.reveal(id)?;
        log::debug!(
            "revealed cell {} -> {:?} ({} win tokens)",
            id,
            outcome,
            game.win_tokens()
        );
        Ok(outcome)
    }

    pub fn continue_after_win(&mut self) -> Result<Screen> {
        self.check_game_state("continue", GameState::Won)?;
        Ok(self.transition(Screen::MathChallenge))
    }

    pub fn accept_loss(&mut self) -> Result<Screen> {
        self.check_game_state("accept loss", GameState::Lost)?;
        Ok(self.transition(Screen::DateSelect))
    }

    /// Replaces a lost board with a fresh one, retries are unlimited.
    pub fn retry(&mut self) -> Result<Screen> {
        self.check_game_state("retry", GameState::Lost)?;
        self.state.game = Some(self.new_board());
        Ok(Screen::RevealGame)
    }

    pub fn submit_math(&mut self, answer: i64) -> Result<MathOutcome> {
        self.check_screen("submit answer", Screen::MathChallenge)?;
        Ok(self.evaluate_math(answer.to_string(), Some(answer)))
    }

    /// Like [`Self::submit_math`], with input that does not parse as an integer counting as wrong.
    pub fn submit_math_text(&mut self, input: &str) -> Result<MathOutcome> {
        self.check_screen("submit answer", Screen::MathChallenge)?;
        let answer = input.trim().parse::<i64>().ok();
        Ok(self.evaluate_math(input.to_owned(), answer))
    }

    pub fn select_gender(&mut self, gender: Gender, now: Instant) -> Result<Deferred> {
        self.check_screen("select gender", Screen::GenderPrompt)?;
        if gender == Gender::Unset {
            return Err(FlowError::UnsetGender);
        }
        if self.pending.is_some() {
            return Err(FlowError::ResponsePending);
        }

        self.state.gender = gender;
        let action = match gender {
            Gender::Female => Deferred::ToFinalQuestion,
            _ => Deferred::Reset,
        };
        self.pending = Some(Scheduled::new(
            action,
            now,
            self.config.response_delay(),
            Screen::GenderPrompt,
        ));
        log::debug!("scheduled {:?} for {:?}", action, gender);
        Ok(action)
    }

    /// Moves the decoy somewhere else, there is no way to actually decline here.
    pub fn hover_or_click_decoy(&mut self) -> Result<DecoyPosition> {
        use rand::prelude::*;

        self.check_screen("move decoy", Screen::FinalQuestion)?;
        let decoy = DecoyPosition {
            x: self.rng.random_range(0.0..=DecoyPosition::MAX_X),
            y: self.rng.random_range(0.0..=DecoyPosition::MAX_Y),
        };
        self.state.decoy = decoy;
        log::trace!("decoy moved to ({:.1}, {:.1})", decoy.x, decoy.y);
        Ok(decoy)
    }

    pub fn accept_final_question(&mut self) -> Result<Screen> {
        self.check_screen("accept", Screen::FinalQuestion)?;
        Ok(self.transition(Screen::DateSelect))
    }

    pub fn confirm_date(&mut self) -> Result<Screen> {
        self.check_screen("confirm date", Screen::DateSelect)?;
        log::info!("date confirmed: {}", self.config.date);
        Ok(self.transition(Screen::FinalConfirm))
    }

    /// Sends the completion notice stamped `at`, then resets even if delivery failed.
    pub fn restart(&mut self, at: DateTime<Utc>) -> Result<Screen> {
        self.check_screen("restart", Screen::FinalConfirm)?;
        let notice = self.config.notice.render(at);
        crate::notify::deliver(&mut self.notifier, &notice);
        self.start();
        Ok(Screen::Initial)
    }

    fn evaluate_math(&mut self, input: String, answer: Option<i64>) -> MathOutcome {
        self.state.math_input = input;
        if answer.is_some() && answer == self.config.challenge_answer() {
            self.transition(Screen::FinalQuestion);
            MathOutcome::Correct
        } else {
            self.state.wrong_attempt = true;
            self.transition(Screen::GenderPrompt);
            MathOutcome::Incorrect
        }
    }

    fn fire(&mut self, action: Deferred) -> Screen {
        log::debug!("firing {:?}", action);
        match action {
            Deferred::ToFinalQuestion => self.transition(Screen::FinalQuestion),
            Deferred::Reset => {
                self.start();
                Screen::Initial
            }
        }
    }

    fn update_gate(&mut self, now: Instant) -> TickOutcome {
        let Some(gate) = self.state.gate else {
            return TickOutcome::Idle;
        };
        if self.state.gate_open {
            return TickOutcome::Idle;
        }

        self.state.gate_remaining = gate.remaining(now);
        if gate.is_elapsed(now) {
            self.state.gate_open = true;
            log::debug!("gate opened");
            TickOutcome::GateOpened
        } else {
            log::trace!("gate closes in {:?}", self.state.gate_remaining);
            TickOutcome::Counting
        }
    }

    fn new_board(&mut self) -> RevealGame {
        use rand::prelude::*;

        ShuffledBoardGenerator::new(self.rng.next_u64()).generate()
    }

    fn transition(&mut self, next: Screen) -> Screen {
        let prev = self.state.screen;
        if prev == next {
            return next;
        }

        if let Some(task) = self.pending.take_if(|task| task.keyed_to() != next) {
            log::debug!("cancelled pending {:?}", task.action());
        }
        if prev == Screen::ConfirmPending {
            self.state.gate = None;
            self.state.gate_remaining = Duration::ZERO;
            self.state.gate_open = false;
        }
        if prev == Screen::RevealGame {
            self.state.game = None;
        }

        self.state.screen = next;
        log::debug!("screen {} -> {}", prev, next);
        next
    }

    fn check_screen(&self, action: &'static str, expected: Screen) -> Result<()> {
        let screen = self.state.screen;
        if screen == expected {
            Ok(())
        } else {
            log::debug!("ignored `{}` on {}", action, screen);
            Err(FlowError::WrongScreen { action, screen })
        }
    }

    fn current_game_mut(&mut self, action: &'static str) -> Result<&mut RevealGame> {
        self.check_screen(action, Screen::RevealGame)?;
        self.state.game.as_mut().ok_or(FlowError::WrongScreen {
            action,
            screen: Screen::RevealGame,
        })
    }

    fn check_game_state(&mut self, action: &'static str, expected: GameState) -> Result<()> {
        let game = self.current_game_mut(action)?;
        if !game.is_finished() {
            Err(FlowError::GameInProgress)
        } else if game.state() != expected {
            Err(FlowError::WrongResult)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TOKEN: &str = "Ab#1xY";

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        sent: Vec<CompletionNotice>,
    }

    impl Notifier for RecordingNotifier {
        type Error = &'static str;

        fn send(&mut self, notice: &CompletionNotice) -> core::result::Result<(), Self::Error> {
            self.sent.push(notice.clone());
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct FailingNotifier {
        attempts: usize,
    }

    impl Notifier for FailingNotifier {
        type Error = &'static str;

        fn send(&mut self, _notice: &CompletionNotice) -> core::result::Result<(), Self::Error> {
            self.attempts += 1;
            Err("mail server unreachable")
        }
    }

    fn config() -> FlowConfig {
        FlowConfig {
            token: Some(TOKEN.to_owned()),
            seed: 1,
            ..Default::default()
        }
    }

    fn controller() -> FlowController<RecordingNotifier> {
        FlowController::with_notifier(config(), RecordingNotifier::default())
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn cell_ids<N: Notifier>(flow: &FlowController<N>, value: CellValue) -> Vec<CellId> {
        flow.state()
            .game()
            .unwrap()
            .cells()
            .iter()
            .filter(|cell| cell.value() == value)
            .map(|cell| cell.id())
            .collect()
    }

    fn at_reveal_game<N: Notifier>(flow: &mut FlowController<N>, now: Instant) {
        flow.decline_initial().unwrap();
        flow.submit_verification(TOKEN, now).unwrap();
        flow.confirm_after_gate().unwrap();
    }

    fn win_game<N: Notifier>(flow: &mut FlowController<N>) {
        let wins = cell_ids(flow, CellValue::WinToken);
        for &id in &wins[..2] {
            assert_eq!(flow.reveal(id).unwrap(), RevealOutcome::Revealed);
        }
        assert_eq!(flow.reveal(wins[2]).unwrap(), RevealOutcome::Won);
    }

    fn lose_game<N: Notifier>(flow: &mut FlowController<N>) {
        let losing = cell_ids(flow, CellValue::LosingToken);
        assert_eq!(flow.reveal(losing[0]).unwrap(), RevealOutcome::Lost);
    }

    fn at_math<N: Notifier>(flow: &mut FlowController<N>, now: Instant) {
        at_reveal_game(flow, now);
        win_game(flow);
        flow.continue_after_win().unwrap();
    }

    #[test]
    fn starts_on_initial_with_defaults() {
        let flow = controller();
        assert_eq!(flow.screen(), Screen::Initial);
        assert_eq!(flow.state(), &FlowState::default());
        assert_eq!(flow.state().decoy(), DecoyPosition { x: 50.0, y: 50.0 });
        assert_eq!(flow.offered_date().to_string(), "2026-02-23");
    }

    #[test]
    fn generated_token_is_fixed_for_the_session() {
        let mut flow = FlowController::new(FlowConfig {
            seed: 99,
            ..Default::default()
        });
        let token = flow.token().to_owned();
        assert_eq!(token.chars().count(), DEFAULT_TOKEN_LEN);

        flow.decline_initial().unwrap();
        flow.start();
        assert_eq!(flow.token(), token);

        let again = FlowController::new(FlowConfig {
            seed: 99,
            ..Default::default()
        });
        assert_eq!(again.token(), token);
    }

    #[test]
    fn accept_initial_skips_every_gate() {
        let mut flow = controller();
        assert_eq!(flow.accept_initial(), Ok(Screen::DateSelect));
        assert!(!flow.state().declined());
    }

    #[test]
    fn decline_is_one_shot() {
        let mut flow = controller();
        assert_eq!(flow.decline_initial(), Ok(Screen::Verify));
        assert!(flow.state().declined());

        assert_eq!(
            flow.decline_initial(),
            Err(FlowError::WrongScreen {
                action: "decline",
                screen: Screen::Verify
            })
        );
        assert!(flow.accept_initial().is_err());

        flow.start();
        assert!(!flow.state().declined());
    }

    #[test]
    fn verification_is_exact_and_case_sensitive() {
        let mut flow = controller();
        let now = Instant::now();
        flow.decline_initial().unwrap();

        for attempt in ["ab#1xy", "AB#1XY", " Ab#1xY", "Ab#1xY ", "Ab#1x", ""] {
            assert_eq!(
                flow.submit_verification(attempt, now),
                Ok(Verification::Rejected)
            );
            assert_eq!(flow.screen(), Screen::Verify);
            assert_eq!(flow.state().verification_input(), attempt);
            assert_eq!(flow.state().gate_deadline(), None);
        }

        assert_eq!(
            flow.submit_verification(TOKEN, now),
            Ok(Verification::Accepted)
        );
        assert_eq!(flow.screen(), Screen::ConfirmPending);
        assert_eq!(flow.state().gate_deadline(), Some(now + ms(15_000)));
        assert!(!flow.state().gate_open());
        assert_eq!(flow.state().gate_seconds_left(), 15);
    }

    #[test]
    fn gate_opens_exactly_at_deadline() {
        let mut flow = controller();
        let start = Instant::now();
        flow.decline_initial().unwrap();
        flow.submit_verification(TOKEN, start).unwrap();

        let mut elapsed = 0;
        while elapsed < 15_000 {
            assert_eq!(flow.tick(start + ms(elapsed)), TickOutcome::Counting);
            assert!(!flow.state().gate_open());
            assert_eq!(flow.state().gate_deadline(), Some(start + ms(15_000)));
            elapsed += 100;
        }

        assert_eq!(flow.tick(start + ms(15_000)), TickOutcome::GateOpened);
        assert!(flow.state().gate_open());
        assert_eq!(flow.state().gate_seconds_left(), 0);
        assert_eq!(flow.tick(start + ms(15_100)), TickOutcome::Idle);
        assert!(flow.state().gate_open());
        assert_eq!(flow.screen(), Screen::ConfirmPending);
    }

    #[test]
    fn zero_gate_delay_opens_on_arm() {
        let mut flow = FlowController::new(FlowConfig {
            gate_delay_ms: 0,
            ..config()
        });
        flow.decline_initial().unwrap();
        flow.submit_verification(TOKEN, Instant::now()).unwrap();
        assert!(flow.state().gate_open());
    }

    #[test]
    fn confirm_is_not_blocked_by_the_gate() {
        let mut flow = controller();
        let now = Instant::now();
        flow.decline_initial().unwrap();
        flow.submit_verification(TOKEN, now).unwrap();

        assert_eq!(flow.confirm_after_gate(), Ok(Screen::RevealGame));
        let game = flow.state().game().unwrap();
        assert_eq!(game.state(), GameState::Active);
        assert_eq!(game.revealed_count(), 0);
        assert_eq!(flow.state().gate_deadline(), None);
        assert!(!flow.state().gate_open());
        assert_eq!(flow.tick(now + ms(20_000)), TickOutcome::Idle);
    }

    #[test]
    fn won_game_continues_to_math() {
        let mut flow = controller();
        at_reveal_game(&mut flow, Instant::now());

        assert_eq!(flow.continue_after_win(), Err(FlowError::GameInProgress));
        assert_eq!(flow.accept_loss(), Err(FlowError::GameInProgress));
        assert_eq!(flow.retry(), Err(FlowError::GameInProgress));
        win_game(&mut flow);
        assert_eq!(flow.accept_loss(), Err(FlowError::WrongResult));
        assert_eq!(flow.retry(), Err(FlowError::WrongResult));

        assert_eq!(flow.continue_after_win(), Ok(Screen::MathChallenge));
        assert!(flow.state().game().is_none());
    }

    #[test]
    fn lost_game_can_retry_or_accept() {
        let mut flow = controller();
        at_reveal_game(&mut flow, Instant::now());

        lose_game(&mut flow);
        let lost = flow.state().game().unwrap().clone();
        let hidden = lost.cells().iter().find(|cell| !cell.is_revealed()).unwrap();
        assert_eq!(flow.reveal(hidden.id()), Err(FlowError::AlreadyEnded));
        assert_eq!(flow.state().game(), Some(&lost));
        assert_eq!(flow.continue_after_win(), Err(FlowError::WrongResult));

        assert_eq!(flow.retry(), Ok(Screen::RevealGame));
        let fresh = flow.state().game().unwrap();
        assert_eq!(fresh.state(), GameState::Active);
        assert_eq!(fresh.revealed_count(), 0);
        assert_eq!(fresh.win_tokens(), 0);

        lose_game(&mut flow);
        assert_eq!(flow.accept_loss(), Ok(Screen::DateSelect));
        assert!(flow.state().game().is_none());
    }

    #[test]
    fn reveal_outside_the_game_is_ignored() {
        let mut flow = controller();
        let before = flow.state().clone();
        assert!(flow.reveal(0).is_err());
        assert_eq!(flow.state(), &before);
    }

    #[test]
    fn correct_math_goes_to_final_question() {
        let mut flow = controller();
        at_math(&mut flow, Instant::now());

        assert_eq!(flow.submit_math(28), Ok(MathOutcome::Correct));
        assert_eq!(flow.screen(), Screen::FinalQuestion);
        assert!(!flow.state().wrong_attempt());
    }

    #[test]
    fn wrong_math_goes_to_gender_prompt() {
        for answer in [0, 27, 29, -28, i64::MAX] {
            let mut flow = controller();
            at_math(&mut flow, Instant::now());

            assert_eq!(flow.submit_math(answer), Ok(MathOutcome::Incorrect));
            assert_eq!(flow.screen(), Screen::GenderPrompt);
            assert!(flow.state().wrong_attempt());
            assert_eq!(flow.state().math_input(), answer.to_string());
            assert!(flow.submit_math(28).is_err());
        }
    }

    #[test]
    fn unanswerable_challenge_never_panics() {
        let mut flow = FlowController::with_notifier(
            FlowConfig {
                challenge_n: i64::MAX,
                ..config()
            },
            RecordingNotifier::default(),
        );
        at_math(&mut flow, Instant::now());

        assert_eq!(flow.submit_math(i64::MAX), Ok(MathOutcome::Incorrect));
        assert_eq!(flow.screen(), Screen::GenderPrompt);
    }

    #[test]
    fn math_text_is_trimmed_and_garbage_is_wrong() {
        let mut flow = controller();
        at_math(&mut flow, Instant::now());
        assert_eq!(flow.submit_math_text(" 28\n"), Ok(MathOutcome::Correct));

        let mut flow = controller();
        at_math(&mut flow, Instant::now());
        assert_eq!(flow.submit_math_text("twenty-eight"), Ok(MathOutcome::Incorrect));
        assert_eq!(flow.state().math_input(), "twenty-eight");
        assert_eq!(flow.screen(), Screen::GenderPrompt);
    }

    #[test]
    fn female_reaches_final_question_after_delay() {
        let mut flow = controller();
        let now = Instant::now();
        at_math(&mut flow, now);
        flow.submit_math(1).unwrap();

        assert_eq!(
            flow.select_gender(Gender::Female, now),
            Ok(Deferred::ToFinalQuestion)
        );
        assert_eq!(flow.state().gender(), Gender::Female);
        assert_eq!(flow.tick(now + ms(1_999)), TickOutcome::Idle);
        assert_eq!(flow.screen(), Screen::GenderPrompt);

        assert_eq!(
            flow.tick(now + ms(2_000)),
            TickOutcome::Fired(Screen::FinalQuestion)
        );
        assert_eq!(flow.screen(), Screen::FinalQuestion);
        assert_eq!(flow.pending_response(), None);
    }

    #[test]
    fn other_genders_reset_after_delay() {
        for gender in [Gender::Male, Gender::Other] {
            let mut flow = controller();
            let now = Instant::now();
            at_math(&mut flow, now);
            flow.submit_math(1).unwrap();

            assert_eq!(flow.select_gender(gender, now), Ok(Deferred::Reset));
            assert_eq!(flow.tick(now + ms(1_000)), TickOutcome::Idle);
            assert_eq!(flow.tick(now + ms(2_500)), TickOutcome::Fired(Screen::Initial));
            assert_eq!(flow.state(), &FlowState::default());
        }
    }

    #[test]
    fn gender_selection_is_evaluated_once() {
        let mut flow = controller();
        let now = Instant::now();
        at_math(&mut flow, now);
        flow.submit_math(1).unwrap();

        assert_eq!(
            flow.select_gender(Gender::Unset, now),
            Err(FlowError::UnsetGender)
        );
        flow.select_gender(Gender::Male, now).unwrap();
        assert_eq!(
            flow.select_gender(Gender::Female, now),
            Err(FlowError::ResponsePending)
        );
        assert_eq!(flow.state().gender(), Gender::Male);
        assert_eq!(flow.pending_response(), Some(Deferred::Reset));
    }

    #[test]
    fn pending_response_is_cancelled_when_the_screen_changes() {
        let mut flow = controller();
        let now = Instant::now();
        at_math(&mut flow, now);
        flow.submit_math(1).unwrap();
        flow.select_gender(Gender::Female, now).unwrap();

        flow.start();
        flow.decline_initial().unwrap();

        assert_eq!(flow.pending_response(), None);
        assert_eq!(flow.tick(now + ms(5_000)), TickOutcome::Idle);
        assert_eq!(flow.screen(), Screen::Verify);
    }

    #[test]
    fn decoy_moves_within_bounds_and_never_changes_screen() {
        let mut flow = controller();
        assert!(flow.hover_or_click_decoy().is_err());
        assert_eq!(flow.state().decoy(), DecoyPosition::default());

        at_math(&mut flow, Instant::now());
        flow.submit_math(28).unwrap();

        let mut previous = flow.state().decoy();
        for _ in 0..1_000 {
            let decoy = flow.hover_or_click_decoy().unwrap();
            assert!(decoy.is_in_bounds(), "{decoy:?}");
            assert_ne!(decoy, previous);
            assert_eq!(flow.state().decoy(), decoy);
            assert_eq!(flow.screen(), Screen::FinalQuestion);
            previous = decoy;
        }
    }

    #[test]
    fn same_seed_replays_the_same_session() {
        let run = || {
            let mut flow = controller();
            at_reveal_game(&mut flow, Instant::now());
            let board = flow.state().game().unwrap().clone();
            win_game(&mut flow);
            flow.continue_after_win().unwrap();
            flow.submit_math(28).unwrap();
            let decoy = flow.hover_or_click_decoy().unwrap();
            (board, decoy)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn out_of_place_events_leave_state_untouched() {
        let mut flow = controller();
        let before = flow.state().clone();
        let now = Instant::now();

        assert!(flow.submit_verification(TOKEN, now).is_err());
        assert!(flow.confirm_after_gate().is_err());
        assert!(flow.submit_math(28).is_err());
        assert!(flow.select_gender(Gender::Female, now).is_err());
        assert!(flow.accept_final_question().is_err());
        assert!(flow.confirm_date().is_err());
        assert!(flow.restart(Utc::now()).is_err());
        assert_eq!(flow.tick(now), TickOutcome::Idle);

        assert_eq!(flow.state(), &before);
        assert!(flow.notifier().sent.is_empty());
    }

    #[test]
    fn full_session_ends_where_it_started() {
        let mut flow = controller();
        let start = Instant::now();
        let fresh = flow.state().clone();

        flow.start();
        assert_eq!(flow.decline_initial(), Ok(Screen::Verify));
        assert_eq!(
            flow.submit_verification(TOKEN, start),
            Ok(Verification::Accepted)
        );

        let mut elapsed = 0;
        while !flow.state().gate_open() {
            elapsed += 100;
            flow.tick(start + ms(elapsed));
        }
        assert_eq!(elapsed, 15_000);

        assert_eq!(flow.confirm_after_gate(), Ok(Screen::RevealGame));
        win_game(&mut flow);
        assert_eq!(flow.continue_after_win(), Ok(Screen::MathChallenge));
        assert_eq!(flow.submit_math(28), Ok(MathOutcome::Correct));
        assert_eq!(flow.accept_final_question(), Ok(Screen::DateSelect));
        assert_eq!(flow.confirm_date(), Ok(Screen::FinalConfirm));

        let at = Utc.with_ymd_and_hms(2026, 2, 14, 20, 0, 0).unwrap();
        assert_eq!(flow.restart(at), Ok(Screen::Initial));

        assert_eq!(flow.state(), &fresh);
        assert_eq!(flow.token(), TOKEN);
        let sent = &flow.notifier().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].timestamp, at);
        assert_eq!(sent[0].message, config().notice.message);
    }

    #[test]
    fn failed_notice_still_resets() {
        let mut flow = FlowController::with_notifier(config(), FailingNotifier::default());
        flow.accept_initial().unwrap();
        flow.confirm_date().unwrap();

        assert_eq!(flow.restart(Utc::now()), Ok(Screen::Initial));
        assert_eq!(flow.state(), &FlowState::default());
        assert_eq!(flow.notifier().attempts, 1);
    }
}
