//! Meeting session state
//!
//! A [`MeetingSession`] holds the two parties' locations and the result of
//! the latest search. Every change bumps a generation counter; a search
//! started with [`MeetingSession::begin_search`] is only applied if nothing
//! changed while it was in flight. Observers follow the session through a
//! `watch` channel of [`SessionSnapshot`]s.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::HalfwayError;
use crate::midpoint::Midpoint;
use crate::models::{Location, Place};
use crate::planner::MeetingPlan;

/// One of the two people meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    A,
    B,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::A => f.write_str("A"),
            Party::B => f.write_str("B"),
        }
    }
}

/// Point-in-time copy of the session handed to observers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub location_a: Option<Location>,
    pub location_b: Option<Location>,
    pub error_a: Option<String>,
    pub error_b: Option<String>,
    pub midpoint: Option<Midpoint>,
    pub places: Vec<Place>,
    pub searching: bool,
    pub search_error: Option<String>,
}

/// Proof of a started search: the generation it belongs to and the
/// locations it was started with
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    generation: u64,
    location_a: Location,
    location_b: Location,
}

impl SearchTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn location_a(&self) -> &Location {
        &self.location_a
    }

    #[must_use]
    pub fn location_b(&self) -> &Location {
        &self.location_b
    }
}

#[derive(Debug)]
pub struct MeetingSession {
    state: SessionSnapshot,
    notifier: watch::Sender<SessionSnapshot>,
}

impl Default for MeetingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MeetingSession {
    #[must_use]
    pub fn new() -> Self {
        let (notifier, _) = watch::channel(SessionSnapshot::default());
        Self {
            state: SessionSnapshot::default(),
            notifier,
        }
    }

    /// Receive a snapshot after every change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.notifier.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.clone()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    #[must_use]
    pub fn location(&self, party: Party) -> Option<&Location> {
        match party {
            Party::A => self.state.location_a.as_ref(),
            Party::B => self.state.location_b.as_ref(),
        }
    }

    #[must_use]
    pub fn midpoint(&self) -> Option<&Midpoint> {
        self.state.midpoint.as_ref()
    }

    #[must_use]
    pub fn places(&self) -> &[Place] {
        &self.state.places
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.state.searching
    }

    /// Replace a party's location; the previous result no longer applies
    pub fn set_location(&mut self, party: Party, location: Location) {
        info!("Location {} set to {}", party, location.display_name());
        *self.slot(party) = Some(location);
        *self.error_slot(party) = None;
        self.invalidate();
    }

    pub fn clear_location(&mut self, party: Party) {
        *self.slot(party) = None;
        *self.error_slot(party) = None;
        self.invalidate();
    }

    /// Remember why a party's location could not be determined
    pub fn record_location_error(&mut self, party: Party, message: impl Into<String>) {
        *self.error_slot(party) = Some(message.into());
        self.notify();
    }

    /// Forget everything
    pub fn clear(&mut self) {
        let generation = self.state.generation + 1;
        self.state = SessionSnapshot {
            generation,
            ..SessionSnapshot::default()
        };
        self.notify();
    }

    /// Drop the midpoint and the places ranked around it
    pub fn clear_midpoint(&mut self) {
        self.invalidate();
    }

    /// Start a search over the current pair of locations. Any search
    /// already in flight becomes stale.
    pub fn begin_search(&mut self) -> Result<SearchTicket, HalfwayError> {
        let (Some(location_a), Some(location_b)) =
            (self.state.location_a.clone(), self.state.location_b.clone())
        else {
            return Err(HalfwayError::state(
                "Both locations must be set before searching",
            ));
        };

        self.state.generation += 1;
        self.state.midpoint = None;
        self.state.places.clear();
        self.state.searching = true;
        self.state.search_error = None;
        self.notify();

        debug!("Search started (generation {})", self.state.generation);
        Ok(SearchTicket {
            generation: self.state.generation,
            location_a,
            location_b,
        })
    }

    /// Apply a finished search. Returns `false` and leaves the session
    /// untouched when the ticket is stale.
    pub fn complete_search(&mut self, ticket: &SearchTicket, plan: MeetingPlan) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        info!(
            "Search complete: {} places around {}",
            plan.places.len(),
            plan.midpoint.location.display_name()
        );
        self.state.midpoint = Some(plan.midpoint);
        self.state.places = plan.places;
        self.state.searching = false;
        self.notify();
        true
    }

    /// Record a failed search. Stale failures are ignored like stale results.
    pub fn fail_search(&mut self, ticket: &SearchTicket, message: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.state.searching = false;
        self.state.search_error = Some(message.into());
        self.notify();
        true
    }

    fn is_current(&self, ticket: &SearchTicket) -> bool {
        if ticket.generation == self.state.generation {
            return true;
        }
        info!(
            "Discarding stale search result (generation {}, current {})",
            ticket.generation, self.state.generation
        );
        false
    }

    fn slot(&mut self, party: Party) -> &mut Option<Location> {
        match party {
            Party::A => &mut self.state.location_a,
            Party::B => &mut self.state.location_b,
        }
    }

    fn error_slot(&mut self, party: Party) -> &mut Option<String> {
        match party {
            Party::A => &mut self.state.error_a,
            Party::B => &mut self.state.error_b,
        }
    }

    fn invalidate(&mut self) {
        self.state.generation += 1;
        self.state.midpoint = None;
        self.state.places.clear();
        self.state.searching = false;
        self.state.search_error = None;
        self.notify();
    }

    fn notify(&self) {
        self.notifier.send_replace(self.state.clone());
    }
}
