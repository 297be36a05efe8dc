//! Positional entry points: a function name plus string arguments.
//!
//! Mutations go through [`MerchantRegistry::invoke`], reads through
//! [`MerchantRegistry::query`]. Argument problems are rejections, reported
//! like any other.

use std::fmt;

use mrm_types::{Merchant, MerchantId, TypeError};
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::outcome::{EntryPoint, Outcome, Rejection};
use crate::registry::MerchantRegistry;

/// Every function reachable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Init,
    CreateMerchant,
    UpdateMerchant,
    DeleteMerchant,
    GetMerchantById,
    GetAllMerchants,
}

impl Function {
    pub const ALL: [Function; 6] = [
        Function::Init,
        Function::CreateMerchant,
        Function::UpdateMerchant,
        Function::DeleteMerchant,
        Function::GetMerchantById,
        Function::GetAllMerchants,
    ];

    /// The wire name of the function.
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::CreateMerchant => "createMerchant",
            Self::UpdateMerchant => "updateMerchant",
            Self::DeleteMerchant => "deleteMerchant",
            Self::GetMerchantById => "getMerchantByID",
            Self::GetAllMerchants => "getAllMerchants",
        }
    }

    /// Look up a function by its wire name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// The entry point the function must be called through.
    pub fn entry_point(self) -> EntryPoint {
        match self {
            Self::GetMerchantById | Self::GetAllMerchants => EntryPoint::Query,
            _ => EntryPoint::Invoke,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn expect_args<S: AsRef<str>>(args: &[S], expected: usize) -> Result<(), TypeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(TypeError::FieldCount {
            expected,
            actual: args.len(),
        })
    }
}

fn single_id<S: AsRef<str>>(args: &[S]) -> Result<MerchantId, TypeError> {
    expect_args(args, 1)?;
    MerchantId::parse(args[0].as_ref())
}

impl MerchantRegistry {
    /// Run a mutating function by name.
    pub fn invoke<S: AsRef<str>>(&self, function: &str, args: &[S]) -> RegistryResult<Outcome<()>> {
        debug!(function, args = args.len(), "invoke");
        match Self::resolve(function, EntryPoint::Invoke) {
            Some(Function::Init) => match expect_args(args, 1) {
                Ok(()) => self.initialize(args[0].as_ref()),
                Err(e) => self.reject_args(e),
            },
            Some(Function::CreateMerchant) => match Merchant::from_args(args) {
                Ok(merchant) => self.create(merchant),
                Err(e) => self.reject_args(e),
            },
            Some(Function::UpdateMerchant) => match Merchant::from_args(args) {
                Ok(merchant) => self.update(&merchant.id, merchant.fields),
                Err(e) => self.reject_args(e),
            },
            Some(Function::DeleteMerchant) => match single_id(args) {
                Ok(id) => self.delete(&id),
                Err(e) => self.reject_args(e),
            },
            _ => self.reject(Rejection::UnknownFunction {
                name: function.to_string(),
                entry: EntryPoint::Invoke,
            }),
        }
    }

    /// Run a read-only function by name, returning the JSON result bytes.
    ///
    /// `getAllMerchants` ignores any arguments it is given.
    pub fn query<S: AsRef<str>>(
        &self,
        function: &str,
        args: &[S],
    ) -> RegistryResult<Outcome<Vec<u8>>> {
        debug!(function, args = args.len(), "query");
        match Self::resolve(function, EntryPoint::Query) {
            Some(Function::GetMerchantById) => {
                let id = match single_id(args) {
                    Ok(id) => id,
                    Err(e) => return self.reject_args(e),
                };
                match self.get(&id)? {
                    Outcome::Completed(merchant) => {
                        let bytes = merchant
                            .to_bytes()
                            .map_err(|e| RegistryError::Serialization(e.to_string()))?;
                        Ok(Outcome::Completed(bytes))
                    }
                    Outcome::Rejected(rejection) => Ok(Outcome::Rejected(rejection)),
                }
            }
            Some(Function::GetAllMerchants) => {
                Ok(Outcome::Completed(self.list_all()?.to_bytes()?))
            }
            _ => self.reject(Rejection::UnknownFunction {
                name: function.to_string(),
                entry: EntryPoint::Query,
            }),
        }
    }

    /// The function `name` refers to, if it is callable through `entry`.
    fn resolve(name: &str, entry: EntryPoint) -> Option<Function> {
        Function::from_name(name).filter(|f| f.entry_point() == entry)
    }

    /// Report an argument error: a rejection, unless it is a hard failure.
    fn reject_args<T>(&self, err: TypeError) -> RegistryResult<Outcome<T>> {
        match Rejection::try_from(err) {
            Ok(rejection) => self.reject(rejection),
            Err(e) => self.report(Err(e), None, ""),
        }
    }

    fn reject<T>(&self, rejection: Rejection) -> RegistryResult<Outcome<T>> {
        self.report(Ok(Outcome::Rejected(rejection)), None, "")
    }
}
