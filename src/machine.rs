//! Event-routed state machine with wildcard transition handlers
//!
//! Routes map `(event, from)` to an ordered list of candidate targets, each
//! optionally guarded by a predicate over the caller's context. The first
//! candidate whose guard passes wins; later candidates under the same key are
//! only reachable when an earlier guard rejects.
//!
//! Handlers are keyed by a pair of [`StatePattern`]s. For a committed
//! transition `from -> to` the machine runs, in this order, every handler
//! registered under `(from, to)`, `(*, to)`, `(from, *)` and `(*, *)`.
//! A failing handler is logged and skipped; the state has already been
//! committed and is never rolled back.

use std::{collections::HashMap, fmt::Debug, hash::Hash};

use tracing::{debug, error, info, warn};

/// Matches a concrete state or any state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatePattern<S> {
    Any,
    Is(S),
}

impl<S> From<S> for StatePattern<S> {
    fn from(state: S) -> Self {
        Self::Is(state)
    }
}

/// Record of one committed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionContext<S, E> {
    pub event: E,
    pub from: S,
    pub to: S,
}

type Guard<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;
type Handler<S, C> = Box<dyn Fn(&mut C, S, S) -> anyhow::Result<()> + Send + Sync>;
type Observer<S, E> = Box<dyn FnMut(&TransitionContext<S, E>) + Send>;

struct Route<S, C> {
    to: S,
    guard: Option<Guard<C>>,
}

/// A flat state machine over states `S`, events `E` and a handler context `C`
///
/// The routing and handler tables are meant to be filled once at setup and
/// only read afterwards.
pub struct StateMachine<S, E, C> {
    current: S,
    routes: HashMap<(E, S), Vec<Route<S, C>>>,
    handlers: HashMap<(StatePattern<S>, StatePattern<S>), Vec<Handler<S, C>>>,
    observers: Vec<Observer<S, E>>,
}

impl<S, E, C> StateMachine<S, E, C>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Hash + Debug,
{
    /// Create a machine resting in `initial`; nothing is dispatched
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            routes: HashMap::new(),
            handlers: HashMap::new(),
            observers: Vec::new(),
        }
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    /// Register an unconditional route
    pub fn add_route(&mut self, event: E, from: S, to: S) {
        self.push_route(event, from, Route { to, guard: None });
    }

    /// Register a route that is only taken while `guard` holds
    pub fn add_guarded_route<G>(&mut self, event: E, from: S, to: S, guard: G)
    where
        G: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.push_route(
            event,
            from,
            Route {
                to,
                guard: Some(Box::new(guard)),
            },
        );
    }

    fn push_route(&mut self, event: E, from: S, route: Route<S, C>) {
        let candidates = self.routes.entry((event, from)).or_default();
        if candidates.iter().any(|existing| existing.guard.is_none()) {
            warn!(
                "Route {:?} --{:?}--> {:?} is shadowed by an earlier unguarded route",
                from, event, route.to
            );
        }
        candidates.push(route);
    }

    /// Register a handler for transitions matching `(from, to)`
    pub fn add_handler<F>(
        &mut self,
        from: impl Into<StatePattern<S>>,
        to: impl Into<StatePattern<S>>,
        handler: F,
    ) where
        F: Fn(&mut C, S, S) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handlers
            .entry((from.into(), to.into()))
            .or_default()
            .push(Box::new(handler));
    }

    /// Register a callback that sees every committed transition before its handlers run
    pub fn observe<F>(&mut self, observer: F)
    where
        F: FnMut(&TransitionContext<S, E>) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Route `event` from the current state
    ///
    /// Returns `false` and leaves the state untouched when no route exists or
    /// every candidate's guard rejects. Otherwise commits the new state, runs
    /// observers and handlers, and returns `true`.
    pub fn handle_event(&mut self, context: &mut C, event: E) -> bool {
        let from = self.current;

        let Some(candidates) = self.routes.get(&(event, from)) else {
            debug!("No route for {:?} from {:?}", event, from);
            return false;
        };

        let selected = candidates
            .iter()
            .find(|route| route.guard.as_ref().map_or(true, |guard| guard(&*context)))
            .map(|route| route.to);

        let Some(to) = selected else {
            debug!("All guarded routes for {:?} from {:?} rejected", event, from);
            return false;
        };

        self.current = to;
        let transition = TransitionContext { event, from, to };
        info!("State transition: {:?} -> {:?} on {:?}", from, to, event);

        for observer in &mut self.observers {
            observer(&transition);
        }
        self.call_handlers(context, from, to);

        true
    }

    fn call_handlers(&self, context: &mut C, from: S, to: S) {
        let tiers = [
            (StatePattern::Is(from), StatePattern::Is(to)),
            (StatePattern::Any, StatePattern::Is(to)),
            (StatePattern::Is(from), StatePattern::Any),
            (StatePattern::Any, StatePattern::Any),
        ];

        for key in tiers {
            let Some(handlers) = self.handlers.get(&key) else {
                continue;
            };
            for handler in handlers {
                if let Err(e) = handler(&mut *context, from, to) {
                    error!("Handler {:?} failed on {:?} -> {:?}: {:#}", key, from, to, e);
                }
            }
        }
    }
}
