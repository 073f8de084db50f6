use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use dxobj_core::{ErrorCode, ObjectId, ObjectKind, Operation, RemoteError};
use serde_json::Value;

use crate::{RemoteCall, Transport};

/// Routes generic operations for one object kind onto a transport.
#[derive(Clone)]
pub struct KindClient {
    /// Kind whose ids this client accepts; `None` accepts any class.
    kind: Option<ObjectKind>,
    /// Underlying request carrier.
    transport: Arc<dyn Transport>,
    /// Next call number, for log correlation.
    next_call: Arc<AtomicU64>,
}

impl KindClient {
    /// Client that only accepts ids of `kind`.
    pub fn new(kind: ObjectKind, transport: Arc<dyn Transport>) -> Self {
        Self {
            kind: Some(kind),
            transport,
            next_call: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Client that routes ids of any class.
    pub fn generic(transport: Arc<dyn Transport>) -> Self {
        Self {
            kind: None,
            transport,
            next_call: Arc::new(AtomicU64::new(1)),
        }
    }

    fn check_target(&self, target: &str, op: Operation) -> Result<(), RemoteError> {
        if target.is_empty() || target.contains('/') {
            return Err(RemoteError::new(
                ErrorCode::InvalidInput,
                format!("invalid route target '{target}' for {}", op.method()),
            ));
        }

        if op == Operation::New
            && let Some(kind) = self.kind
            && target != kind.class_name()
        {
            return Err(RemoteError::new(
                ErrorCode::InvalidType,
                format!("{} client cannot create '{target}'", kind.class_name()),
            ));
        }

        Ok(())
    }
}

impl RemoteCall for KindClient {
    fn invoke(&self, target: &str, op: Operation, params: Value) -> Result<Value, RemoteError> {
        self.check_target(target, op)?;

        let call = self.next_call.fetch_add(1, Ordering::Relaxed);
        let route = format!("/{target}/{}", op.method());
        tracing::debug!(call, route = %route, "invoking remote method");

        let result = self.transport.request(&route, params);
        if let Err(err) = &result {
            tracing::debug!(call, route = %route, error = %err, "remote method failed");
        }
        result
    }

    fn accepts(&self, object_id: &ObjectId) -> bool {
        match self.kind {
            Some(kind) => ObjectKind::from_id(object_id) == Some(kind),
            None => true,
        }
    }
}
