//! Recipient resolution: merging address sources and extracting phone numbers.

use crate::core::AlertInfo;
use std::collections::BTreeSet;
use tracing::{debug, error};

/// Extracts phone numbers from the local part of address-like strings.
///
/// Receivers are expected to use their mobile number as the mailbox name
/// (`13800000000@example.com`). The accepted length depends on the national
/// numbering plan, 11 digits by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoneExtractor {
    length: usize,
}

impl PhoneExtractor {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Returns the text before the first `@` if it has the expected length.
    pub fn extract<'a>(&self, address: &'a str) -> Option<&'a str> {
        let local = address.split('@').next().unwrap_or(address);
        (local.chars().count() == self.length).then_some(local)
    }
}

impl Default for PhoneExtractor {
    fn default() -> Self {
        Self::new(11)
    }
}

/// Merges the property-bag receivers with `receivers` and `receivers_cc`.
///
/// The returned list is a fresh copy; the caller's alert is left untouched.
pub fn merge_receivers(info: &AlertInfo) -> Vec<String> {
    let mut merged = info.prop_receivers();
    merged.extend(split_addresses(&info.alert_data.receivers));
    merged.extend(split_addresses(&info.alert_data.receivers_cc));
    merged
}

fn split_addresses(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .filter(move |s| {
            if s.is_empty() {
                debug!(receivers = %list, "Skipping empty receiver entry");
            }
            !s.is_empty()
        })
        .map(str::to_string)
}

/// Resolves the distinct phone numbers of every address in `addresses`.
///
/// Addresses without a valid phone number are logged and skipped.
pub fn resolve_phones<S: AsRef<str>>(
    addresses: &[S],
    extractor: &PhoneExtractor,
) -> BTreeSet<String> {
    let mut phones = BTreeSet::new();
    for address in addresses {
        let address = address.as_ref();
        match extractor.extract(address) {
            Some(phone) => {
                phones.insert(phone.to_string());
            }
            None => error!(
                email = %address,
                "alert email does not contain correct phone number"
            ),
        }
    }
    phones
}

/// Joins phone numbers the way the SMS gateway expects them.
pub fn join_phones(phones: &BTreeSet<String>) -> String {
    phones.iter().map(String::as_str).collect::<Vec<_>>().join("/")
}
