use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use crate::{
    cart::store::{CartSnapshot, CartStore},
    checkout::payload::PayloadStash,
    error::{AppError, AppResult},
    storage::{ClientStorage, ScopedStorage},
};

/// One shopper: their cart, their staged checkout and an in-flight flag.
#[derive(Debug)]
pub struct CartSession {
    id: String,
    cart: Mutex<CartStore>,
    stash: PayloadStash,
    submitting: AtomicBool,
    last_seen: Mutex<Instant>,
}

impl CartSession {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stash(&self) -> &PayloadStash {
        &self.stash
    }

    /// Runs a cart mutation and returns the resulting snapshot.
    pub fn update<F>(&self, f: F) -> AppResult<CartSnapshot>
    where
        F: FnOnce(&mut CartStore),
    {
        let mut cart = self.lock()?;
        f(&mut cart);
        Ok(cart.snapshot())
    }

    pub fn snapshot(&self) -> AppResult<CartSnapshot> {
        Ok(self.lock()?.snapshot())
    }

    pub fn subscribe(&self) -> AppResult<tokio::sync::watch::Receiver<CartSnapshot>> {
        Ok(self.lock()?.subscribe())
    }

    pub fn clear_cart(&self) -> AppResult<()> {
        self.lock()?.clear_cart();
        Ok(())
    }

    /// Claims the session for one order submission; `None` if one is already running.
    pub fn begin_submission(self: &Arc<Self>) -> Option<SubmissionGuard> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionGuard {
                session: Arc::clone(self),
            })
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    fn touch(&self) {
        if let Ok(mut seen) = self.last_seen.lock() {
            *seen = Instant::now();
        }
    }

    fn idle_since(&self) -> Option<Instant> {
        self.last_seen.lock().ok().map(|seen| *seen)
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, CartStore>> {
        self.cart
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("cart lock poisoned")))
    }
}

#[derive(Debug)]
pub struct SubmissionGuard {
    session: Arc<CartSession>,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.session.submitting.store(false, Ordering::Release);
    }
}

/// Live sessions keyed by id. Idle ones are evicted after `idle_ttl` and
/// reloaded from storage on their next request.
#[derive(Debug)]
pub struct CartSessions {
    carts: Arc<dyn ClientStorage>,
    staging: Arc<dyn ClientStorage>,
    payload_ttl: Duration,
    idle_ttl: Duration,
    sessions: Mutex<HashMap<String, Arc<CartSession>>>,
}

impl CartSessions {
    pub fn new(
        carts: Arc<dyn ClientStorage>,
        staging: Arc<dyn ClientStorage>,
        payload_ttl: Duration,
    ) -> Self {
        Self {
            carts,
            staging,
            payload_ttl,
            idle_ttl: payload_ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the live session, creating and loading its cart on first use.
    pub fn get_or_create(&self, id: &str) -> AppResult<Arc<CartSession>> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("session registry poisoned")))?;

        if let Some(session) = sessions.get(id) {
            session.touch();
            return Ok(Arc::clone(session));
        }

        let cart_storage: Arc<dyn ClientStorage> =
            Arc::new(ScopedStorage::new(Arc::clone(&self.carts), id));
        let staging: Arc<dyn ClientStorage> =
            Arc::new(ScopedStorage::new(Arc::clone(&self.staging), id));

        let session = Arc::new(CartSession {
            id: id.to_string(),
            cart: Mutex::new(CartStore::create(cart_storage)),
            stash: PayloadStash::new(staging, self.payload_ttl),
            submitting: AtomicBool::new(false),
            last_seen: Mutex::new(Instant::now()),
        });
        sessions.insert(id.to_string(), Arc::clone(&session));
        tracing::debug!(session = %id, "cart session loaded");

        Ok(session)
    }

    /// Drops a session from memory after flushing its cart.
    pub fn dispose(&self, id: &str) -> AppResult<()> {
        let removed = self
            .sessions
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("session registry poisoned")))?
            .remove(id);

        if let Some(session) = removed {
            release(id, session);
        }

        Ok(())
    }

    /// Drops sessions untouched for longer than the idle TTL. Sessions held by a
    /// request or a running submission stay. Returns how many were evicted.
    pub fn evict_idle(&self) -> AppResult<usize> {
        let Some(cutoff) = Instant::now().checked_sub(self.idle_ttl) else {
            return Ok(0);
        };

        let evicted: Vec<(String, Arc<CartSession>)> = {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| AppError::Internal(anyhow::anyhow!("session registry poisoned")))?;
            let idle: Vec<String> = sessions
                .iter()
                .filter(|(_, session)| {
                    Arc::strong_count(session) == 1
                        && !session.is_submitting()
                        && session.idle_since().is_some_and(|seen| seen <= cutoff)
                })
                .map(|(id, _)| id.clone())
                .collect();
            idle.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|session| (id, session)))
                .collect()
        };

        let count = evicted.len();
        for (id, session) in evicted {
            release(&id, session);
        }
        if count > 0 {
            tracing::debug!(evicted = count, "idle cart sessions evicted");
        }
        Ok(count)
    }

    /// Runs [`CartSessions::evict_idle`] on a fixed interval for the life of the process.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) {
        let me = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                if let Err(err) = me.evict_idle() {
                    tracing::error!(error = %err, "cart session sweep failed");
                }
            }
        });
    }
}

fn release(id: &str, session: Arc<CartSession>) {
    match Arc::try_unwrap(session) {
        Ok(session) => {
            if let Ok(cart) = session.cart.into_inner() {
                cart.dispose();
            }
        }
        Err(_) => tracing::debug!(session = %id, "session still in use, dropped from registry"),
    }
}

pub fn is_valid_session_id(id: &str) -> bool {
    (8..=64).contains(&id.len())
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
