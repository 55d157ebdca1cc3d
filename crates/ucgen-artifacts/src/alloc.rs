//! Static IPv6 address allocation for federates on constrained transports.
//!
//! Addresses are handed out inside a fixed `/64` prefix (`fd01::/64` by
//! default) as `prefix + suffix`, with the suffix counting up from 1.
//! Addresses reserved through [`AddressAllocator::mark_as_used`] are never
//! handed out, and the counter only moves forward.
//!
//! An allocator lives for one federation generation pass. When several
//! passes in one process must share numbering, wrap it in a
//! [`SharedAllocator`]; holding its lock for a whole pass is what keeps
//! `reset` from interleaving with an in-flight pass.

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv6Addr};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::{debug, trace};

use crate::error::{ArtifactError, Result};

/// Default federate address prefix, `fd01::/64`.
pub const DEFAULT_PREFIX: Ipv6Addr = Ipv6Addr::new(0xfd01, 0, 0, 0, 0, 0, 0, 0);

const INITIAL_SUFFIX: u64 = 1;

/// Collision-free address allocator for one federation pass.
#[derive(Debug, Clone)]
pub struct AddressAllocator {
    /// Upper 64 bits of every allocated address.
    prefix: u64,
    /// `None` once the last suffix of the prefix has been issued or reserved.
    next_suffix: Option<u64>,
    /// Normalized textual form of every issued or registered address.
    reserved: BTreeSet<String>,
}

impl Default for AddressAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressAllocator {
    /// An allocator over [`DEFAULT_PREFIX`].
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    /// An allocator over the `/64` containing `prefix`. The lower 64 bits are ignored.
    pub fn with_prefix(prefix: Ipv6Addr) -> Self {
        Self {
            prefix: (u128::from(prefix) >> 64) as u64,
            next_suffix: Some(INITIAL_SUFFIX),
            reserved: BTreeSet::new(),
        }
    }

    /// Forget all reservations and restart numbering at 1.
    pub fn reset(&mut self) {
        self.next_suffix = Some(INITIAL_SUFFIX);
        self.reserved.clear();
    }

    /// The `/64` prefix as an address with a zero interface id.
    pub fn prefix(&self) -> Ipv6Addr {
        Ipv6Addr::from(u128::from(self.prefix) << 64)
    }

    /// The next suffix that will be tried, or `None` when the prefix is used up.
    pub fn next_suffix(&self) -> Option<u64> {
        self.next_suffix
    }

    /// Whether `address` (in any textual form) is already reserved.
    pub fn is_reserved(&self, address: &str) -> bool {
        self.reserved.contains(&normalize(address))
    }

    /// Normalized reserved addresses, in sorted order.
    pub fn reserved(&self) -> impl Iterator<Item = &str> {
        self.reserved.iter().map(String::as_str)
    }

    /// Hand out the next free address in the prefix.
    ///
    /// Candidates that normalize to an already-reserved address are skipped.
    /// Every suffix up to and including `u64::MAX` is issued before this
    /// fails, which in practice means the reservation bookkeeping is broken.
    pub fn next_address(&mut self) -> Result<Ipv6Addr> {
        loop {
            let suffix = self
                .next_suffix
                .ok_or_else(|| ArtifactError::AddressSpaceExhausted {
                    prefix: self.prefix().to_string(),
                })?;
            self.next_suffix = suffix.checked_add(1);
            let candidate = self.address_for(suffix);
            if self.reserved.insert(normalize(&candidate.to_string())) {
                debug!(address = %candidate, "allocated federate address");
                return Ok(candidate);
            }
            trace!(address = %candidate, "candidate already reserved, retrying");
        }
    }

    /// Reserve an address so it is never handed out.
    ///
    /// Only IPv6-shaped input is recorded; anything else is ignored. An
    /// in-prefix address also moves the counter past its suffix. The counter
    /// never moves backwards.
    pub fn mark_as_used(&mut self, address: &str) {
        let text = address.trim();
        if !is_ipv6_shaped(text) {
            debug!(address = text, "ignoring non-IPv6 reservation");
            return;
        }
        self.reserved.insert(normalize(text));
        if let Ok(ip) = text.parse::<Ipv6Addr>() {
            self.advance_past(ip);
        }
    }

    fn address_for(&self, suffix: u64) -> Ipv6Addr {
        Ipv6Addr::from((u128::from(self.prefix) << 64) | u128::from(suffix))
    }

    fn advance_past(&mut self, ip: Ipv6Addr) {
        let bits = u128::from(ip);
        if (bits >> 64) as u64 != self.prefix {
            return;
        }
        let suffix = bits as u64;
        if let Some(next) = self.next_suffix {
            self.next_suffix = suffix.checked_add(1).map(|past| past.max(next));
        }
    }
}

/// Canonical lowercase text of an address.
///
/// Falls back to plain lowercasing when the text does not parse, so a
/// cosmetic address problem never aborts generation.
pub fn normalize(address: &str) -> String {
    let text = address.trim();
    match text.parse::<IpAddr>() {
        Ok(ip) => ip.to_string(),
        Err(_) => {
            trace!(address = text, "address does not parse, normalizing by lowercasing");
            text.to_lowercase()
        }
    }
}

fn is_ipv6_shaped(text: &str) -> bool {
    match text.parse::<IpAddr>() {
        Ok(ip) => ip.is_ipv6(),
        Err(_) => text.contains(':'),
    }
}

/// An allocator shared between generation passes in one process.
///
/// Callers must hold [`SharedAllocator::lock`] for the whole pass.
#[derive(Debug, Clone, Default)]
pub struct SharedAllocator {
    inner: Arc<Mutex<AddressAllocator>>,
}

impl SharedAllocator {
    pub fn new(allocator: AddressAllocator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(allocator)),
        }
    }

    /// The process-wide allocator used when shared numbering is enabled.
    pub fn process_wide() -> Self {
        static SHARED: OnceLock<SharedAllocator> = OnceLock::new();
        SHARED.get_or_init(SharedAllocator::default).clone()
    }

    /// Exclusive access for one generation pass.
    pub fn lock(&self) -> Result<MutexGuard<'_, AddressAllocator>> {
        self.inner.lock().map_err(|_| ArtifactError::AllocatorPoisoned)
    }

    /// Reset between independent passes. Blocks while a pass holds the lock.
    pub fn reset(&self) -> Result<()> {
        self.lock()?.reset();
        Ok(())
    }
}
