// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone and record matching for DNS-01 challenges.

use crate::constants::TXT_RECORD_TYPE;
use crate::provider::{DnsRecord, Zone};

/// Return every zone whose name, with a trailing dot, is a suffix of `fqdn`.
///
/// `fqdn` is the trailing-dot FQDN from cert-manager, e.g.
/// `_acme-challenge.foo.example.com.`. Nested zones all match: with zones
/// `example.com` and `foo.example.com` both are returned, in input order.
/// An empty result is not an error. Names compare ASCII case-insensitively.
#[must_use]
pub fn find_owning_zones<'a>(fqdn: &str, zones: &'a [Zone]) -> Vec<&'a Zone> {
    let fqdn = fqdn.to_ascii_lowercase();
    zones
        .iter()
        .filter(|zone| fqdn.ends_with(&format!("{}.", zone.name.to_ascii_lowercase())))
        .collect()
}

/// Check whether `record` is the TXT record for this challenge.
///
/// All three of type, name and content must match. Records sharing the name
/// but carrying a different key belong to concurrent challenges and must be
/// left alone. The name compares case-insensitively, the key exactly.
#[must_use]
pub fn is_challenge_record(record: &DnsRecord, fqdn: &str, key: &str) -> bool {
    record.record_type.eq_ignore_ascii_case(TXT_RECORD_TYPE)
        && format!("{}.", record.name).eq_ignore_ascii_case(fqdn)
        && record.content == key
}
