//! Choice collection protocol
//!
//! Each turn a duelist answers two timeout-bounded choice steps. The engine
//! issues a [`ChoiceRequest`] to the duelist's [`ChoiceSurface`] and waits on
//! the paired oneshot receiver; the surface answers through the request's
//! [`ChoiceTicket`]. A ticket resolves at most once, so a late or repeated
//! answer can never overwrite the first one.

use crate::core::{AttackId, CardCatalog, Duelist, Family, Play, Seat, Stance};
use crate::game::{legal_plays, DuelLogger, LogCategory, VerbosityLevel};
use crate::{DuelError, Result};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::oneshot;

static NEXT_TICKET_ID: AtomicU64 = AtomicU64::new(1);

/// Which of the two per-turn decisions is being asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceStep {
    First,
    Second,
}

/// Result of offering a ticket an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Accepted,
    /// The ticket was already answered, timed out, or retired
    AlreadyResolved,
}

type AnswerSlot = Mutex<Option<oneshot::Sender<Play>>>;

fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// An answer that reached a ticket after it was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedAnswer {
    pub ticket_id: u64,
    pub seat: Seat,
    pub play: Play,
}

/// Shared record of rejected answers
///
/// Tickets push into it from whatever thread the surface answers on; the
/// duel loop drains it into its logger. Late answers that arrive after a
/// step has ended are recorded the same way as double answers.
#[derive(Debug, Clone, Default)]
pub struct RejectionLog {
    entries: Arc<Mutex<Vec<RejectedAnswer>>>,
}

impl RejectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: RejectedAnswer) {
        lock_recovering(&*self.entries).push(entry);
    }

    pub fn len(&self) -> usize {
        lock_recovering(&*self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take everything recorded so far
    pub fn drain(&self) -> Vec<RejectedAnswer> {
        std::mem::take(&mut *lock_recovering(&*self.entries))
    }

    /// Log and clear everything recorded so far
    pub fn report(&self, catalog: &CardCatalog, logger: &DuelLogger) {
        for entry in self.drain() {
            logger.categorized(
                VerbosityLevel::Normal,
                LogCategory::Choice,
                &format!(
                    "{}: ignored answer {} to choice #{}, which was already settled",
                    entry.seat,
                    catalog.play_name(entry.play),
                    entry.ticket_id
                ),
            );
        }
    }
}

/// Single-use handle a surface answers a choice through
///
/// Cloning is cheap; every clone shares the same at-most-once slot, so a
/// surface can hand one to each button it renders. Only surface-side clones
/// keep the slot alive: once a surface drops all of them the engine stops
/// waiting.
#[derive(Debug, Clone)]
pub struct ChoiceTicket {
    id: u64,
    seat: Seat,
    slot: Arc<AnswerSlot>,
    rejected: Arc<AtomicUsize>,
    rejections: RejectionLog,
}

/// Engine-side handle to a presented ticket
///
/// Holds the slot weakly so it never keeps the sender alive.
#[derive(Debug)]
struct TicketCloser {
    slot: Weak<AnswerSlot>,
}

impl TicketCloser {
    /// Close the ticket so any later answer is rejected
    fn close(&self) {
        if let Some(slot) = self.slot.upgrade() {
            lock_recovering(&*slot).take();
        }
    }
}

impl ChoiceTicket {
    /// Create a ticket and the receiver the engine waits on
    pub fn new() -> (ChoiceTicket, oneshot::Receiver<Play>) {
        Self::for_seat(Seat::P1, RejectionLog::new())
    }

    /// Create a ticket for `seat` that records rejected answers in `rejections`
    pub fn for_seat(seat: Seat, rejections: RejectionLog) -> (ChoiceTicket, oneshot::Receiver<Play>) {
        let (tx, rx) = oneshot::channel();
        let ticket = ChoiceTicket {
            id: NEXT_TICKET_ID.fetch_add(1, Ordering::Relaxed),
            seat,
            slot: Arc::new(Mutex::new(Some(tx))),
            rejected: Arc::new(AtomicUsize::new(0)),
            rejections,
        };
        (ticket, rx)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Answer the choice; only the first answer counts
    pub fn resolve(&self, play: Play) -> Resolution {
        let sender = lock_recovering(&*self.slot).take();
        match sender {
            Some(tx) => match tx.send(play) {
                Ok(()) => Resolution::Accepted,
                Err(_) => self.reject(play),
            },
            None => self.reject(play),
        }
    }

    fn reject(&self, play: Play) -> Resolution {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        self.rejections.push(RejectedAnswer {
            ticket_id: self.id,
            seat: self.seat,
            play,
        });
        Resolution::AlreadyResolved
    }

    pub fn is_resolved(&self) -> bool {
        lock_recovering(&*self.slot).is_none()
    }

    /// Answers that arrived after the ticket was already settled
    pub fn rejected_answers(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }

    fn closer(&self) -> TicketCloser {
        TicketCloser {
            slot: Arc::downgrade(&self.slot),
        }
    }
}

/// Read-only snapshot of the duel from one duelist's side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelistView {
    pub seat: Seat,
    pub cell: usize,
    pub hp: u8,
    pub stance: Stance,
    pub special: AttackId,
    pub special_used: bool,
    pub locked: Option<Family>,
    pub opponent_cell: usize,
    pub opponent_hp: u8,
    pub opponent_stance: Stance,
}

impl DuelistView {
    pub fn new(me: &Duelist, opponent: &OpponentSnapshot) -> Self {
        DuelistView {
            seat: me.seat,
            cell: me.cell,
            hp: me.hp,
            stance: me.stance,
            special: me.special,
            special_used: me.special_used,
            locked: me.locked,
            opponent_cell: opponent.cell,
            opponent_hp: opponent.hp,
            opponent_stance: opponent.stance,
        }
    }

    /// Cells between the two duelists
    pub fn distance(&self) -> usize {
        self.cell.abs_diff(self.opponent_cell)
    }
}

/// The opponent's public state, captured before choices are collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpponentSnapshot {
    pub cell: usize,
    pub hp: u8,
    pub stance: Stance,
}

impl From<&Duelist> for OpponentSnapshot {
    fn from(d: &Duelist) -> Self {
        OpponentSnapshot {
            cell: d.cell,
            hp: d.hp,
            stance: d.stance,
        }
    }
}

/// A choice presented to one duelist
#[derive(Debug, Clone)]
pub struct ChoiceRequest {
    pub seat: Seat,
    pub step: ChoiceStep,
    /// Prompt text (special status, first move, instruction)
    pub header: String,
    /// Legal plays in presentation order
    pub options: Vec<Play>,
    /// How long the duelist has to answer
    pub timeout: Duration,
    pub view: DuelistView,
    pub ticket: ChoiceTicket,
}

/// Collaborator that shows choices to a duelist and relays their answer
pub trait ChoiceSurface {
    /// Show a choice; answer later (or never) through `request.ticket`
    fn present(&mut self, request: ChoiceRequest);

    /// Withdraw a presented choice once it produced a result
    fn retire(&mut self, _ticket_id: u64) {}

    /// Called when the duel ends
    fn on_duel_end(&mut self, _view: &DuelistView, _won: bool) {}
}

/// Outcome of a single timeout-bounded step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceOutcome {
    Selected(Play),
    TimedOut,
}

/// Outcome of a duelist's whole two-step collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPlays {
    Chosen(Play, Play),
    TimedOut,
}

/// Wait for a ticket's answer, bounded by `timeout`
///
/// A surface that drops every clone of its ticket without answering can
/// never answer, so that counts as a timeout straight away.
pub async fn await_choice(rx: oneshot::Receiver<Play>, timeout: Duration) -> ChoiceOutcome {
    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(play)) => ChoiceOutcome::Selected(play),
        Ok(Err(_)) | Err(_) => ChoiceOutcome::TimedOut,
    }
}

fn special_info(catalog: &CardCatalog, duelist: &Duelist) -> String {
    let name = &catalog.attack(duelist.special).name;
    if duelist.special_used {
        format!("Special already used ({})", name)
    } else {
        format!("Special available: {}", name)
    }
}

/// Present one step, wait for the answer, and retire the presentation
#[allow(clippy::too_many_arguments)]
async fn run_step(
    catalog: &CardCatalog,
    duelist: &Duelist,
    opponent: &OpponentSnapshot,
    surface: &mut dyn ChoiceSurface,
    step: ChoiceStep,
    header: String,
    options: Vec<Play>,
    timeout: Duration,
    rejections: &RejectionLog,
) -> Result<ChoiceOutcome> {
    let (ticket, rx) = ChoiceTicket::for_seat(duelist.seat, rejections.clone());
    let ticket_id = ticket.id();
    let closer = ticket.closer();
    let request = ChoiceRequest {
        seat: duelist.seat,
        step,
        header,
        options: options.clone(),
        timeout,
        view: DuelistView::new(duelist, opponent),
        ticket,
    };

    surface.present(request);
    let outcome = await_choice(rx, timeout).await;
    closer.close();
    surface.retire(ticket_id);

    if let ChoiceOutcome::Selected(play) = outcome {
        if !options.contains(&play) {
            return Err(DuelError::IllegalPlay(format!(
                "{} selected {}, which was not offered",
                duelist.name,
                catalog.play_name(play)
            )));
        }
    }
    Ok(outcome)
}

/// Record a selection on the duelist, marking their special as used
fn record_play(catalog: &CardCatalog, duelist: &mut Duelist, play: Play, logger: &DuelLogger) {
    if catalog.is_special(play) {
        duelist.special_used = true;
    }
    duelist.add_queued_play(play);
    logger.duelist_choice(duelist.name.as_str(), &format!("chose {}", catalog.play_name(play)));
}

/// Run both choice steps for one duelist
///
/// Only this duelist's state is touched: its chosen-plays buffer and its
/// special-used flag, so two collections can run side by side. Answers a
/// ticket refuses land in `rejections`.
pub async fn collect_turn_plays(
    catalog: &CardCatalog,
    duelist: &mut Duelist,
    opponent: OpponentSnapshot,
    surface: &mut dyn ChoiceSurface,
    timeout: Duration,
    rejections: &RejectionLog,
    logger: &DuelLogger,
) -> Result<TurnPlays> {
    let info = special_info(catalog, duelist);
    let first_options = legal_plays(catalog, duelist, None, false);
    let first = run_step(
        catalog,
        duelist,
        &opponent,
        surface,
        ChoiceStep::First,
        format!("{}\nChoose first move:", info),
        first_options,
        timeout,
        rejections,
    )
    .await?;
    let ChoiceOutcome::Selected(first_play) = first else {
        logger.categorized(
            VerbosityLevel::Normal,
            LogCategory::Choice,
            &format!("{} timed out on the first choice", duelist.name),
        );
        return Ok(TurnPlays::TimedOut);
    };
    record_play(catalog, duelist, first_play, logger);

    let pending_flip = catalog.changes_stance(first_play);
    let second_options = legal_plays(catalog, duelist, Some(first_play), pending_flip);
    let second = run_step(
        catalog,
        duelist,
        &opponent,
        surface,
        ChoiceStep::Second,
        format!(
            "{}\nFirst Move: {}\nChoose second move:",
            info,
            catalog.play_name(first_play)
        ),
        second_options,
        timeout,
        rejections,
    )
    .await?;
    let ChoiceOutcome::Selected(second_play) = second else {
        logger.categorized(
            VerbosityLevel::Normal,
            LogCategory::Choice,
            &format!("{} timed out on the second choice", duelist.name),
        );
        return Ok(TurnPlays::TimedOut);
    };
    record_play(catalog, duelist, second_play, logger);

    Ok(TurnPlays::Chosen(first_play, second_play))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Emblem, MoveId};

    /// Surface that answers each step with a fixed play, or never
    struct Canned {
        answers: Vec<Option<Play>>,
        presented: Vec<ChoiceRequest>,
        retired: Vec<u64>,
        held: Vec<ChoiceTicket>,
    }

    impl Canned {
        fn new(answers: Vec<Option<Play>>) -> Self {
            Canned {
                answers,
                presented: Vec::new(),
                retired: Vec::new(),
                held: Vec::new(),
            }
        }
    }

    impl ChoiceSurface for Canned {
        fn present(&mut self, request: ChoiceRequest) {
            let answer = if self.answers.is_empty() {
                None
            } else {
                self.answers.remove(0)
            };
            match answer {
                Some(play) => {
                    request.ticket.resolve(play);
                }
                None => self.held.push(request.ticket.clone()),
            }
            self.presented.push(request);
        }

        fn retire(&mut self, ticket_id: u64) {
            self.retired.push(ticket_id);
        }
    }

    fn duelist() -> Duelist {
        Duelist::new(Seat::P1, "Alice", "@alice", Emblem::new("🐻"), 0, AttackId::Counter, 2)
    }

    fn opponent() -> OpponentSnapshot {
        OpponentSnapshot { cell: 4, hp: 2, stance: Stance::Heaven }
    }

    #[test]
    fn test_ticket_resolves_once() {
        let (ticket, mut rx) = ChoiceTicket::new();
        let clone = ticket.clone();
        assert_eq!(ticket.resolve(Play::Move(MoveId::Approach)), Resolution::Accepted);
        assert_eq!(clone.resolve(Play::Move(MoveId::Retreat)), Resolution::AlreadyResolved);
        assert!(ticket.is_resolved());
        assert_eq!(ticket.rejected_answers(), 1);
        assert_eq!(rx.try_recv().unwrap(), Play::Move(MoveId::Approach));
    }

    #[tokio::test]
    async fn test_collects_two_plays_and_marks_special() {
        let catalog = CardCatalog::standard();
        let logger = DuelLogger::with_verbosity(VerbosityLevel::Silent);
        let mut d = duelist();
        let mut surface = Canned::new(vec![
            Some(Play::Attack(AttackId::Counter)),
            Some(Play::Move(MoveId::Approach)),
        ]);

        let result = collect_turn_plays(
            &catalog,
            &mut d,
            opponent(),
            &mut surface,
            Duration::from_secs(800),
            &RejectionLog::new(),
            &logger,
        )
        .await
        .unwrap();

        assert_eq!(
            result,
            TurnPlays::Chosen(Play::Attack(AttackId::Counter), Play::Move(MoveId::Approach))
        );
        assert!(d.special_used);
        assert_eq!(d.chosen_plays.len(), 2);

        // Step two no longer offers the special and headers reflect the first move
        assert_eq!(surface.presented.len(), 2);
        assert!(!surface.presented[1].options.contains(&Play::Attack(AttackId::Counter)));
        assert_eq!(
            surface.presented[0].header,
            "Special available: Counterattack\nChoose first move:"
        );
        assert_eq!(
            surface.presented[1].header,
            "Special available: Counterattack\nFirst Move: Counterattack\nChoose second move:"
        );
        // Every presentation is retired once it produced a result
        assert_eq!(surface.retired.len(), 2);
        assert_eq!(surface.retired[0], surface.presented[0].ticket.id());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_step_timeout() {
        let catalog = CardCatalog::standard();
        let logger = DuelLogger::with_verbosity(VerbosityLevel::Silent);
        let mut d = duelist();
        let mut surface = Canned::new(vec![Some(Play::Move(MoveId::Charge)), None]);

        let result = collect_turn_plays(
            &catalog,
            &mut d,
            opponent(),
            &mut surface,
            Duration::from_secs(800),
            &RejectionLog::new(),
            &logger,
        )
        .await
        .unwrap();

        assert_eq!(result, TurnPlays::TimedOut);
        assert_eq!(surface.retired.len(), 2);
        // A late answer after the timeout is rejected
        assert_eq!(
            surface.held[0].resolve(Play::Move(MoveId::Approach)),
            Resolution::AlreadyResolved
        );
    }

    #[tokio::test]
    async fn test_unoffered_play_is_fatal() {
        let catalog = CardCatalog::standard();
        let logger = DuelLogger::with_verbosity(VerbosityLevel::Silent);
        let mut d = duelist();
        // Low Strike needs Earth stance; Alice is in Heaven
        let mut surface = Canned::new(vec![Some(Play::Attack(AttackId::LowStrike))]);

        let result = collect_turn_plays(
            &catalog,
            &mut d,
            opponent(),
            &mut surface,
            Duration::from_secs(800),
            &RejectionLog::new(),
            &logger,
        )
        .await;
        assert!(matches!(result, Err(DuelError::IllegalPlay(_))));
    }

    #[tokio::test]
    async fn test_dropped_ticket_counts_as_timeout() {
        struct Dropper;
        impl ChoiceSurface for Dropper {
            fn present(&mut self, _request: ChoiceRequest) {}
        }

        let catalog = CardCatalog::standard();
        let logger = DuelLogger::with_verbosity(VerbosityLevel::Silent);
        let mut d = duelist();
        let start = std::time::Instant::now();
        let result = collect_turn_plays(
            &catalog,
            &mut d,
            opponent(),
            &mut Dropper,
            Duration::from_secs(2),
            &RejectionLog::new(),
            &logger,
        )
        .await
        .unwrap();

        assert_eq!(result, TurnPlays::TimedOut);
        assert!(d.chosen_plays.is_empty());
        // Real clock: nothing can answer, so the engine must not sit out the timeout
        assert!(start.elapsed() < Duration::from_secs(1), "waited {:?}", start.elapsed());
    }

    #[test]
    fn test_engine_handle_does_not_keep_ticket_alive() {
        let (ticket, mut rx) = ChoiceTicket::new();
        let closer = ticket.closer();
        drop(ticket);
        assert!(matches!(
            rx.try_recv(),
            Err(tokio::sync::oneshot::error::TryRecvError::Closed)
        ));
        closer.close();
    }

    #[test]
    fn test_rejected_answers_are_logged() {
        let rejections = RejectionLog::new();
        let (ticket, _rx) = ChoiceTicket::for_seat(Seat::P2, rejections.clone());
        assert_eq!(ticket.resolve(Play::Move(MoveId::Approach)), Resolution::Accepted);
        assert_eq!(ticket.resolve(Play::Move(MoveId::Retreat)), Resolution::AlreadyResolved);
        assert_eq!(rejections.len(), 1);

        let catalog = CardCatalog::standard();
        let mut logger = DuelLogger::with_verbosity(VerbosityLevel::Silent);
        logger.enable_capture();
        rejections.report(&catalog, &logger);

        assert!(rejections.is_empty());
        let lines = logger.messages_in(LogCategory::Choice);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("p2: ignored answer Retreat to choice #"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_after_step_ended_is_recorded() {
        let catalog = CardCatalog::standard();
        let logger = DuelLogger::with_verbosity(VerbosityLevel::Silent);
        let rejections = RejectionLog::new();
        let mut d = duelist();
        let mut surface = Canned::new(vec![None]);

        let result = collect_turn_plays(
            &catalog,
            &mut d,
            opponent(),
            &mut surface,
            Duration::from_secs(5),
            &rejections,
            &logger,
        )
        .await
        .unwrap();
        assert_eq!(result, TurnPlays::TimedOut);
        assert_eq!(surface.presented[0].timeout, Duration::from_secs(5));
        assert!(rejections.is_empty());

        surface.held[0].resolve(Play::Move(MoveId::Approach));
        assert_eq!(
            rejections.drain(),
            vec![RejectedAnswer {
                ticket_id: surface.held[0].id(),
                seat: Seat::P1,
                play: Play::Move(MoveId::Approach),
            }]
        );
    }
}
