//! Duelist controller trait
//!
//! This module defines the interface between the duel engine and the things
//! that pick plays (AI or human). The engine talks to a [`ChoiceSurface`];
//! [`ControllerSurface`] adapts a synchronous controller to that surface, and
//! [`BlockingSurface`] does the same for controllers that wait on I/O.

use crate::core::{Play, Seat};
use crate::game::choice::{ChoiceRequest, ChoiceStep, ChoiceSurface, ChoiceTicket, DuelistView};
use std::sync::{Arc, Mutex};

/// Decision maker for one duelist
///
/// The engine only ever offers legal plays. Returning `None` leaves the choice
/// unanswered, which the engine treats as the duelist running out of time.
pub trait DuelistController {
    /// Which seat this controller plays
    fn seat(&self) -> Seat;

    /// Pick one of `options` for the given step
    fn choose_play(
        &mut self,
        view: &DuelistView,
        step: ChoiceStep,
        header: &str,
        options: &[Play],
    ) -> Option<Play>;

    /// Notification that the duel ended
    fn on_duel_end(&mut self, _view: &DuelistView, _won: bool) {}
}

impl<C: DuelistController + ?Sized> DuelistController for Box<C> {
    fn seat(&self) -> Seat {
        (**self).seat()
    }

    fn choose_play(
        &mut self,
        view: &DuelistView,
        step: ChoiceStep,
        header: &str,
        options: &[Play],
    ) -> Option<Play> {
        (**self).choose_play(view, step, header, options)
    }

    fn on_duel_end(&mut self, view: &DuelistView, won: bool) {
        (**self).on_duel_end(view, won)
    }
}

/// Surface that answers every request by asking a controller
pub struct ControllerSurface<C: DuelistController> {
    controller: C,
    /// Unanswered tickets stay open until the engine retires them
    pending: Vec<ChoiceTicket>,
}

impl<C: DuelistController> ControllerSurface<C> {
    pub fn new(controller: C) -> Self {
        ControllerSurface {
            controller,
            pending: Vec::new(),
        }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn into_inner(self) -> C {
        self.controller
    }

    /// Choices presented but not yet retired
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl<C: DuelistController> ChoiceSurface for ControllerSurface<C> {
    fn present(&mut self, request: ChoiceRequest) {
        match self
            .controller
            .choose_play(&request.view, request.step, &request.header, &request.options)
        {
            Some(play) => {
                request.ticket.resolve(play);
            }
            None => self.pending.push(request.ticket),
        }
    }

    fn retire(&mut self, ticket_id: u64) {
        self.pending.retain(|t| t.id() != ticket_id);
    }

    fn on_duel_end(&mut self, view: &DuelistView, won: bool) {
        self.controller.on_duel_end(view, won);
    }
}

/// Surface that runs a blocking controller on tokio's blocking pool
///
/// `present` returns straight away, so the step timeout keeps running while
/// the controller waits (on a terminal, say) and the other duelist is not
/// held up. An answer that comes in after the step ended is refused by the
/// ticket. Requests wait their turn for the controller, so a line typed too
/// late for one step is spent on that step, not the next.
pub struct BlockingSurface<C> {
    controller: Arc<Mutex<C>>,
}

impl<C: DuelistController + Send + 'static> BlockingSurface<C> {
    pub fn new(controller: C) -> Self {
        BlockingSurface {
            controller: Arc::new(Mutex::new(controller)),
        }
    }

    fn ask(controller: &Mutex<C>, request: ChoiceRequest) {
        let mut controller = match controller.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let header = format!(
            "{}\n({} seconds to answer)",
            request.header,
            request.timeout.as_secs()
        );
        if let Some(play) =
            controller.choose_play(&request.view, request.step, &header, &request.options)
        {
            request.ticket.resolve(play);
        }
    }
}

impl<C: DuelistController + Send + 'static> ChoiceSurface for BlockingSurface<C> {
    fn present(&mut self, request: ChoiceRequest) {
        let controller = Arc::clone(&self.controller);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                drop(handle.spawn_blocking(move || Self::ask(&controller, request)));
            }
            // No runtime to hand off to
            Err(_) => Self::ask(&controller, request),
        }
    }

    fn on_duel_end(&mut self, view: &DuelistView, won: bool) {
        // Skipped while a prompt still holds the controller
        if let Ok(mut controller) = self.controller.try_lock() {
            controller.on_duel_end(view, won);
        }
    }
}

/// A controller that never answers
///
/// Every choice it is offered runs into the timeout. Used to exercise the
/// forfeit paths.
#[derive(Debug, Clone, Copy)]
pub struct SilentController {
    seat: Seat,
}

impl SilentController {
    pub fn new(seat: Seat) -> Self {
        SilentController { seat }
    }
}

impl DuelistController for SilentController {
    fn seat(&self) -> Seat {
        self.seat
    }

    fn choose_play(
        &mut self,
        _view: &DuelistView,
        _step: ChoiceStep,
        _header: &str,
        _options: &[Play],
    ) -> Option<Play> {
        None
    }
}
