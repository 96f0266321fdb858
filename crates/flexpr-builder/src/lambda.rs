//! Finished artifacts.

use std::sync::Arc;

use flexpr_core::{BuildError, DataType};

use crate::ast::{NodeRef, Variable, VariableId};

/// Return and parameter types of a lambda.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub return_type: DataType,
    pub params: Vec<DataType>,
}

impl Signature {
    pub fn new(return_type: DataType, params: Vec<DataType>) -> Self {
        Self {
            return_type,
            params,
        }
    }

    /// A parameterless signature returning `return_type`.
    pub fn expression(return_type: DataType) -> Self {
        Self::new(return_type, Vec::new())
    }

    /// A signature returning nothing.
    pub fn action(params: Vec<DataType>) -> Self {
        Self::new(DataType::Void, params)
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Bind parameter names to the parameter types.
    pub fn bind(&self, names: &[&str]) -> Result<Vec<Arc<Variable>>, BuildError> {
        if names.len() != self.params.len() {
            return Err(BuildError::SignatureArity {
                expected: self.params.len(),
                found: names.len(),
            });
        }
        Ok(names
            .iter()
            .zip(&self.params)
            .enumerate()
            .map(|(index, (name, data_type))| {
                Arc::new(Variable {
                    id: VariableId(index as u32),
                    name: (*name).to_string(),
                    data_type: *data_type,
                })
            })
            .collect())
    }
}

/// A finished tree together with the parameters it refers to.
#[derive(Debug, Clone)]
pub struct Lambda {
    parameters: Vec<Arc<Variable>>,
    body: NodeRef,
    return_type: DataType,
}

impl Lambda {
    pub(crate) fn new(parameters: Vec<Arc<Variable>>, body: NodeRef, return_type: DataType) -> Self {
        Self {
            parameters,
            body,
            return_type,
        }
    }

    pub fn parameters(&self) -> &[Arc<Variable>] {
        &self.parameters
    }

    pub fn body(&self) -> &NodeRef {
        &self.body
    }

    pub fn return_type(&self) -> DataType {
        self.return_type
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}
