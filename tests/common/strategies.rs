//! proptest strategies for clients and match rules

use proptest::prelude::*;
use snippets_core::models::{Client, ClientField};

/// Short lowercase tokens so literals and prefixes collide often
pub fn token_strategy() -> impl Strategy<Value = String> {
    "[a-c]{1,3}"
}

pub fn client_strategy() -> impl Strategy<Value = Client> {
    prop::collection::vec(token_strategy(), 10).prop_map(|values| Client {
        startpage_version: values[0].clone(),
        name: values[1].clone(),
        version: values[2].clone(),
        appbuildid: values[3].clone(),
        build_target: values[4].clone(),
        locale: values[5].clone(),
        channel: values[6].clone(),
        os_version: values[7].clone(),
        distribution: values[8].clone(),
        distribution_version: values[9].clone(),
    })
}

pub fn field_strategy() -> impl Strategy<Value = ClientField> {
    prop::sample::select(ClientField::ALL.to_vec())
}

pub fn locale_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{2}",
        "[a-z]{2}-[a-z]{2}",
        "[a-z]{2}-[A-Z]{2}",
    ]
}

pub fn channel_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("release".to_string()),
        Just("beta".to_string()),
        Just("aurora".to_string()),
        Just("nightly".to_string()),
        Just("esr".to_string()),
        "(release|beta|aurora|nightly|esr)-[a-z]{1,5}",
        "[a-z]{1,8}",
    ]
}
