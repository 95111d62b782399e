use tracing::debug;

use crate::assign::DefaultAssigner;
use crate::bridge::BridgeMethodResolver;
use crate::code_attribute::CodeSink;
use crate::description::{MethodDescription, TypeDescription, TypeHierarchy};
use crate::error::{Error, Result};
use crate::options::DelegationOptions;
use crate::stack::{StackEffect, StackManipulation};

use super::binder::{bind, BindingContext};
use super::{no_binding, BindingAttempt, Candidate, ParameterBinding};

/// The committed result of delegating one intercepted method.
#[derive(Clone, Debug, PartialEq)]
pub struct Delegation {
    pub target: MethodDescription,
    pub plan: Vec<ParameterBinding>,
    pub manipulation: StackManipulation,
    pub effect: StackEffect,
    pub max_stack: u16,
    pub max_locals: u16,
}

impl Delegation {
    pub fn apply(&self, sink: &mut dyn CodeSink) -> Result<StackEffect> {
        self.manipulation.apply(sink)
    }
}

/// Runs scan, bind, resolve and commit for intercepted methods of one type.
pub struct Processor<'a> {
    hierarchy: &'a dyn TypeHierarchy,
    options: DelegationOptions,
    bridges: BridgeMethodResolver,
}

impl<'a> Processor<'a> {
    pub fn new(hierarchy: &'a dyn TypeHierarchy, options: DelegationOptions) -> Self {
        Processor {
            hierarchy,
            options,
            bridges: BridgeMethodResolver::no_op(),
        }
    }

    /// Routes committed targets through the bridge table of the handler type.
    pub fn with_bridges(mut self, bridges: BridgeMethodResolver) -> Self {
        self.bridges = bridges;
        self
    }

    /// Builds a bridge table for `methods` with the configured conflict policy.
    pub fn index_bridges(&self, methods: &[MethodDescription]) -> Result<BridgeMethodResolver> {
        BridgeMethodResolver::build(methods, self.hierarchy, self.options.bridge_conflicts)
    }

    pub fn options(&self) -> &DelegationOptions {
        &self.options
    }

    fn assigner(&self) -> DefaultAssigner<'a> {
        DefaultAssigner::new(self.hierarchy).with_void_policy(self.options.void_policy)
    }

    /// Collects the methods of a handler type that may receive delegations from
    /// `instrumented`: static, non-private, not synthetic, not constructors,
    /// visible from `instrumented` and accepted by `filter`.
    pub fn scan<F>(&self, instrumented: &TypeDescription, methods: &[MethodDescription], filter: F) -> Vec<Candidate>
    where
        F: Fn(&MethodDescription) -> bool,
    {
        methods
            .iter()
            .filter(|method| {
                method.is_static()
                    && !method.is_private()
                    && !method.is_synthetic()
                    && !method.is_constructor()
                    && method.is_visible_to(instrumented)
                    && filter(method)
            })
            .cloned()
            .map(Candidate::new)
            .collect()
    }

    /// One attempt per candidate, in candidate order.
    pub fn bind_all(&self, source: &MethodDescription, candidates: &[Candidate]) -> Vec<BindingAttempt> {
        let assigner = self.assigner();
        let context = BindingContext {
            assigner: &assigner,
            typing: self.options.typing,
            termination: self.options.termination,
            invoker: &self.options.invoker,
        };
        candidates
            .iter()
            .map(|candidate| bind(source, candidate, &context))
            .collect()
    }

    /// Picks the single attempt to commit among `attempts`.
    pub fn resolve(&self, source: &MethodDescription, attempts: Vec<BindingAttempt>) -> Result<BindingAttempt> {
        let (valid, rejected): (Vec<_>, Vec<_>) = attempts.into_iter().partition(BindingAttempt::is_valid);
        if valid.is_empty() {
            return Err(no_binding(source, &rejected));
        }
        self.options
            .binding_resolver
            .resolve(&self.options.ambiguity, source, valid, self.hierarchy)
    }

    /// Binds `source` to exactly one of `candidates` and linearizes the result.
    pub fn process(&self, source: &MethodDescription, candidates: &[Candidate]) -> Result<Delegation> {
        let attempts = self.bind_all(source, candidates);
        let chosen = self.resolve(source, attempts)?;
        let chosen = self.skip_bridge(source, candidates, chosen)?;
        self.commit(source, chosen)
    }

    /// Rebinds the winner against its bridge target when it is a bridge.
    fn skip_bridge(
        &self,
        source: &MethodDescription,
        candidates: &[Candidate],
        chosen: BindingAttempt,
    ) -> Result<BindingAttempt> {
        let resolved = self.bridges.resolve(&chosen.target)?;
        if *resolved == chosen.target {
            return Ok(chosen);
        }
        let Some(candidate) = candidates.iter().find(|c| c.method == chosen.target) else {
            return Ok(chosen);
        };
        let rebound = Candidate {
            method: resolved.clone(),
            ..candidate.clone()
        };
        let attempt = self
            .bind_all(source, std::slice::from_ref(&rebound))
            .pop()
            .filter(BindingAttempt::is_valid);
        attempt.ok_or_else(|| Error::BridgeUnresolved {
            method: chosen.target.to_string(),
        })
    }

    fn commit(&self, source: &MethodDescription, chosen: BindingAttempt) -> Result<Delegation> {
        let manipulation = chosen.to_manipulation();
        if !manipulation.is_valid() {
            return Err(Error::InvalidApply {
                manipulation: format!("{:?}", manipulation),
            });
        }
        let effect = manipulation.effect();
        debug!(
            source = %source,
            target = %chosen.target,
            %effect,
            "committed delegation"
        );
        Ok(Delegation {
            target: chosen.target,
            plan: chosen.plan,
            manipulation,
            effect,
            max_stack: effect.max_intermediate() as u16,
            max_locals: source.stack_size() as u16,
        })
    }
}
