//! End-to-end flows across `dag-merge` and `block-validation`.

#[cfg(test)]
pub(crate) mod fixtures;

#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod scenarios;
