//! Properties that hold across every curve and key variant.

#[cfg(test)]
mod keys;
#[cfg(test)]
mod signatures;
