//! 1-bit signal and logic primitives.
//!
//! A [`Fragment`] is the unit of emitted hardware: an ordered list of
//! combinational statements and an ordered list of clocked statements.
//! Comb-driven signals default to 0 each evaluation; sync-driven signals
//! keep their value unless assigned on a clock edge.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{BitAnd, BitOr, Not};
use core::sync::atomic::{AtomicU64, Ordering};

static NEXT_SIGNAL_ID: AtomicU64 = AtomicU64::new(0);

/// Process-wide unique identity of a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignalId(u64);

impl SignalId {
    fn next() -> Self {
        Self(NEXT_SIGNAL_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// A named 1-bit net. Clones refer to the same net.
#[derive(Debug, Clone)]
pub struct Signal {
    id: SignalId,
    name: String,
}

impl Signal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SignalId::next(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> SignalId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Statement driving this signal with `value`.
    pub fn drive(&self, value: impl Into<Expr>) -> Stmt {
        Stmt::Assign {
            target: self.id,
            value: value.into(),
        }
    }
}

impl PartialEq for Signal {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Signal {}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id.0)
    }
}

/// Boolean expression over signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Const(bool),
    Sig(SignalId),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// OR-reduction. Reducing nothing yields constant 0.
    pub fn any_of<I>(terms: I) -> Expr
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        terms
            .into_iter()
            .map(Into::<Expr>::into)
            .reduce(|acc, term| acc | term)
            .unwrap_or(Expr::Const(false))
    }

    /// Evaluates the expression, reading signal values through `value_of`.
    pub fn eval(&self, value_of: &impl Fn(SignalId) -> bool) -> bool {
        match self {
            Expr::Const(v) => *v,
            Expr::Sig(id) => value_of(*id),
            Expr::Not(e) => !e.eval(value_of),
            Expr::And(a, b) => a.eval(value_of) && b.eval(value_of),
            Expr::Or(a, b) => a.eval(value_of) || b.eval(value_of),
        }
    }
}

impl From<bool> for Expr {
    fn from(v: bool) -> Self {
        Expr::Const(v)
    }
}

impl From<&Signal> for Expr {
    fn from(s: &Signal) -> Self {
        Expr::Sig(s.id)
    }
}

impl<T: Into<Expr>> BitAnd<T> for Expr {
    type Output = Expr;

    fn bitand(self, rhs: T) -> Expr {
        Expr::And(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<Expr>> BitOr<T> for Expr {
    type Output = Expr;

    fn bitor(self, rhs: T) -> Expr {
        Expr::Or(Box::new(self), Box::new(rhs.into()))
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// A single assignment, possibly guarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Assign { target: SignalId, value: Expr },
    If { cond: Expr, then: Vec<Stmt> },
}

impl Stmt {
    /// `if cond { then }`
    pub fn when(cond: impl Into<Expr>, then: Vec<Stmt>) -> Stmt {
        Stmt::If {
            cond: cond.into(),
            then,
        }
    }

    fn collect_targets(&self, out: &mut BTreeSet<SignalId>) {
        match self {
            Stmt::Assign { target, .. } => {
                out.insert(*target);
            }
            Stmt::If { then, .. } => then.iter().for_each(|s| s.collect_targets(out)),
        }
    }
}

/// Emitted logic: combinational and clocked statement lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub comb: Vec<Stmt>,
    pub sync: Vec<Stmt>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `other` after this fragment's statements.
    pub fn extend(&mut self, other: Fragment) {
        self.comb.extend(other.comb);
        self.sync.extend(other.sync);
    }

    pub fn is_empty(&self) -> bool {
        self.comb.is_empty() && self.sync.is_empty()
    }

    /// Signals driven by combinational statements.
    pub fn comb_targets(&self) -> BTreeSet<SignalId> {
        let mut out = BTreeSet::new();
        self.comb.iter().for_each(|s| s.collect_targets(&mut out));
        out
    }

    /// Signals driven by clocked statements.
    pub fn sync_targets(&self) -> BTreeSet<SignalId> {
        let mut out = BTreeSet::new();
        self.sync.iter().for_each(|s| s.collect_targets(&mut out));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn signal_ids_are_unique() {
        let a = Signal::new("a");
        let b = Signal::new("a");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert!(a.id() < b.id());
    }

    #[test]
    fn empty_reduction_is_zero() {
        let e = Expr::any_of(core::iter::empty::<Expr>());
        assert_eq!(e, Expr::Const(false));
        assert!(!e.eval(&|_| true));
    }

    #[test]
    fn eval_reads_through_lookup() {
        let a = Signal::new("a");
        let b = Signal::new("b");
        let e = (Expr::from(&a) & &b) | !Expr::from(true);
        let (ia, ib) = (a.id(), b.id());
        assert!(e.eval(&|id| id == ia || id == ib));
        assert!(!e.eval(&|id| id == ia));
    }

    #[test]
    fn targets_include_guarded_assignments() {
        let a = Signal::new("a");
        let b = Signal::new("b");
        let mut f = Fragment::new();
        f.comb.push(a.drive(false));
        f.sync.push(Stmt::when(&a, vec![b.drive(true)]));
        assert!(f.comb_targets().contains(&a.id()));
        assert!(f.sync_targets().contains(&b.id()));
        assert!(!f.comb_targets().contains(&b.id()));
    }
}
