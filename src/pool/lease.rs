//! Borrowed pool instances
//!
//! The pool, not the borrower, owns the cache lease behind every instance.
//! A [`Lease`] is the borrower's proof of loan: only a pool can create one,
//! and handing it back with [`Pool::put`](super::Pool::put) is the only way
//! to return the instance.

use std::cell::Cell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// Per-pool bookkeeping shared with every lease the pool issues.
#[derive(Debug, Default)]
pub(crate) struct LeaseLedger {
    /// Leases issued and not yet returned or dropped
    outstanding: Cell<u32>,
    /// Leases dropped without being returned; their cache uses are still held
    forfeited: Cell<u32>,
}

impl LeaseLedger {
    pub(crate) fn outstanding(&self) -> u32 {
        self.outstanding.get()
    }

    pub(crate) fn forfeited(&self) -> u32 {
        self.forfeited.get()
    }

    /// Reset the forfeited count, returning what it was
    pub(crate) fn settle_forfeited(&self) -> u32 {
        self.forfeited.replace(0)
    }
}

/// An instance borrowed from a [`Pool`](super::Pool).
///
/// Dereferences to the instance. Dropping a lease without returning it
/// forfeits the instance; the pool still releases its cache use on the
/// next `clear()`.
#[derive(Debug)]
pub struct Lease<I> {
    instance: I,
    ticket: LeaseTicket,
}

/// Ledger entry for one lease; forfeits the lease unless it was returned.
#[derive(Debug)]
struct LeaseTicket {
    ledger: Rc<LeaseLedger>,
    returned: bool,
}

impl<I> Lease<I> {
    pub(crate) fn issue(instance: I, ledger: &Rc<LeaseLedger>) -> Self {
        ledger.outstanding.set(ledger.outstanding.get() + 1);
        Self {
            instance,
            ticket: LeaseTicket {
                ledger: Rc::clone(ledger),
                returned: false,
            },
        }
    }

    /// Whether this lease was issued against `ledger`
    pub(crate) fn is_from(&self, ledger: &Rc<LeaseLedger>) -> bool {
        Rc::ptr_eq(&self.ticket.ledger, ledger)
    }

    /// Hand the instance back to the issuing pool's bookkeeping
    pub(crate) fn redeem(self) -> I {
        let Self {
            instance,
            mut ticket,
        } = self;
        let ledger = &ticket.ledger;
        ledger
            .outstanding
            .set(ledger.outstanding.get().saturating_sub(1));
        ticket.returned = true;
        instance
    }
}

impl<I> Deref for Lease<I> {
    type Target = I;

    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}

impl<I> DerefMut for Lease<I> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.instance
    }
}

impl Drop for LeaseTicket {
    fn drop(&mut self) {
        if !self.returned {
            let ledger = &self.ledger;
            ledger
                .outstanding
                .set(ledger.outstanding.get().saturating_sub(1));
            ledger.forfeited.set(ledger.forfeited.get() + 1);
            log::warn!("Pool lease dropped without being returned; instance forfeited");
        }
    }
}
