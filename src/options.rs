use crate::assign::{Typing, VoidPolicy};
use crate::bind::{AmbiguityChain, BindingResolver, MethodInvoker, TerminationHandler};
use crate::bridge::ConflictPolicy;

/// Settings shared by every delegation a [`Processor`](crate::bind::Processor) performs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegationOptions {
    pub typing: Typing,
    pub void_policy: VoidPolicy,
    pub termination: TerminationHandler,
    pub invoker: MethodInvoker,
    pub binding_resolver: BindingResolver,
    pub ambiguity: AmbiguityChain,
    pub bridge_conflicts: ConflictPolicy,
}

impl Default for DelegationOptions {
    fn default() -> Self {
        DelegationOptions {
            typing: Typing::Static,
            void_policy: VoidPolicy::Reject,
            termination: TerminationHandler::Returning,
            invoker: MethodInvoker::Simple,
            binding_resolver: BindingResolver::Default,
            ambiguity: AmbiguityChain::default(),
            bridge_conflicts: ConflictPolicy::FailFast,
        }
    }
}

impl DelegationOptions {
    pub fn typing(mut self, typing: Typing) -> Self {
        self.typing = typing;
        self
    }

    pub fn void_policy(mut self, void_policy: VoidPolicy) -> Self {
        self.void_policy = void_policy;
        self
    }

    pub fn termination(mut self, termination: TerminationHandler) -> Self {
        self.termination = termination;
        self
    }

    pub fn invoker(mut self, invoker: MethodInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    pub fn binding_resolver(mut self, binding_resolver: BindingResolver) -> Self {
        self.binding_resolver = binding_resolver;
        self
    }

    pub fn ambiguity(mut self, ambiguity: AmbiguityChain) -> Self {
        self.ambiguity = ambiguity;
        self
    }

    pub fn bridge_conflicts(mut self, bridge_conflicts: ConflictPolicy) -> Self {
        self.bridge_conflicts = bridge_conflicts;
        self
    }
}
