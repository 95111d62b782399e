//! Maps compiler generated bridge methods to the method they forward to.
//!
//! A table is built once per declaring type and is read-only afterwards; it can
//! be shared between threads that generate different method bodies.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::description::{MethodDescription, SignatureKey, TypeHierarchy};
use crate::error::{Error, Result};

/// What to do when a bridge has more than one possible target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ConflictPolicy {
    /// Refuse to build the table.
    #[default]
    FailFast,
    /// Build the table, but fail when the conflicting bridge is resolved.
    FailOnRequest,
    /// Treat the bridge as its own target.
    CallBridge,
}

/// Where a bridge leads. Indices point into the resolver's method arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BridgeTarget {
    Resolved(usize),
    /// May itself be a bridge.
    Candidate(usize),
    Unknown,
}

#[derive(Clone, Debug, Default)]
pub struct BridgeMethodResolver {
    methods: Vec<MethodDescription>,
    bridges: HashMap<SignatureKey, BridgeTarget>,
}

impl BridgeMethodResolver {
    /// A resolver that knows no bridges and returns every method unchanged.
    pub fn no_op() -> Self {
        BridgeMethodResolver::default()
    }

    /// Builds the bridge table for the declared methods of one type.
    ///
    /// Each bridge is linked to the non-bridge method that specializes it. Two or
    /// more such methods are a conflict handled by `policy`, however they relate
    /// to each other. A bridge specialized only by other bridges links to the
    /// most direct of them and is resolved through it.
    pub fn build(
        methods: &[MethodDescription],
        hierarchy: &dyn TypeHierarchy,
        policy: ConflictPolicy,
    ) -> Result<Self> {
        let mut bridges = HashMap::new();
        for (index, bridge) in methods.iter().enumerate() {
            if !bridge.is_bridge() {
                continue;
            }
            let key = bridge.signature_key();
            if bridges.contains_key(&key) {
                continue;
            }
            let target = find_target(methods, index, hierarchy, policy)?;
            bridges.insert(key, target);
        }
        debug!(bridges = bridges.len(), methods = methods.len(), "built bridge table");
        Ok(BridgeMethodResolver {
            methods: methods.to_vec(),
            bridges,
        })
    }

    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }

    pub fn target(&self, method: &MethodDescription) -> Option<BridgeTarget> {
        self.bridges.get(&method.signature_key()).copied()
    }

    /// Follows bridge links from `method` to the method that should really be
    /// invoked. Methods that are not known bridges resolve to themselves.
    pub fn resolve<'a>(&'a self, method: &'a MethodDescription) -> Result<&'a MethodDescription> {
        let mut current = method;
        let mut visited = HashSet::new();
        loop {
            let key = current.signature_key();
            let Some(target) = self.bridges.get(&key) else {
                return Ok(current);
            };
            if !visited.insert(key) {
                return Err(Error::BridgeCycle {
                    method: method.to_string(),
                });
            }
            match *target {
                BridgeTarget::Resolved(index) => return Ok(&self.methods[index]),
                BridgeTarget::Candidate(index) => current = &self.methods[index],
                BridgeTarget::Unknown => {
                    return Err(Error::BridgeUnresolved {
                        method: current.to_string(),
                    })
                }
            }
        }
    }
}

fn find_target(
    methods: &[MethodDescription],
    bridge_index: usize,
    hierarchy: &dyn TypeHierarchy,
    policy: ConflictPolicy,
) -> Result<BridgeTarget> {
    let bridge = &methods[bridge_index];
    let (bridges, concrete): (Vec<usize>, Vec<usize>) = methods
        .iter()
        .enumerate()
        .filter(|(index, candidate)| *index != bridge_index && candidate.is_specialization_of(bridge, hierarchy))
        .map(|(index, _)| index)
        .partition(|&index| methods[index].is_bridge());

    if !concrete.is_empty() {
        return match concrete.as_slice() {
            [only] => Ok(BridgeTarget::Candidate(*only)),
            conflicting => on_conflict(methods, bridge_index, conflicting, policy),
        };
    }

    // Only other bridges specialize this one: link to the most direct of them
    // and let resolution follow the chain.
    let direct: Vec<usize> = bridges
        .iter()
        .copied()
        .filter(|&index| {
            !bridges.iter().any(|&other| {
                other != index
                    && methods[index].is_specialization_of(&methods[other], hierarchy)
                    && !methods[other].is_specialization_of(&methods[index], hierarchy)
            })
        })
        .collect();
    match direct.as_slice() {
        [] if bridges.is_empty() => Ok(BridgeTarget::Resolved(bridge_index)),
        // every specialization specializes another: a malformed cycle
        [] => Ok(BridgeTarget::Candidate(bridges[0])),
        [only] => Ok(BridgeTarget::Candidate(*only)),
        conflicting => on_conflict(methods, bridge_index, conflicting, policy),
    }
}

fn on_conflict(
    methods: &[MethodDescription],
    bridge_index: usize,
    conflicting: &[usize],
    policy: ConflictPolicy,
) -> Result<BridgeTarget> {
    let bridge = &methods[bridge_index];
    let candidates: Vec<String> = conflicting.iter().map(|&i| methods[i].to_string()).collect();
    match policy {
        ConflictPolicy::FailFast => Err(Error::BridgeConflict {
            bridge: bridge.to_string(),
            candidates,
        }),
        ConflictPolicy::FailOnRequest => {
            warn!(bridge = %bridge, ?candidates, "bridge target left unresolved");
            Ok(BridgeTarget::Unknown)
        }
        ConflictPolicy::CallBridge => {
            warn!(bridge = %bridge, ?candidates, "calling bridge directly");
            Ok(BridgeTarget::Resolved(bridge_index))
        }
    }
}
