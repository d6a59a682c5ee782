//! Send/Sync guarantees for core types.

use mqttlog::{
    FlushLoop, JsonFormatter, MqttHandler, MqttHandlerBuilder, MqttHandlerConfig, Publisher,
    SharedFormatter, rate_limited_warner::RateLimitedWarner,
};
use rstest::rstest;
use static_assertions::{assert_impl_all, assert_obj_safe};

#[rstest]
fn builders_are_send_sync() {
    assert_impl_all!(MqttHandlerBuilder: Send, Sync, Clone);
    assert_impl_all!(MqttHandlerConfig: Send, Sync, Clone);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(MqttHandler: Send, Sync);
    assert_impl_all!(FlushLoop: Send);
    assert_impl_all!(SharedFormatter: Send, Sync, Clone);
    assert_impl_all!(JsonFormatter: Send, Sync);
    assert_impl_all!(RateLimitedWarner: Send, Sync);
}

assert_obj_safe!(Publisher);

#[cfg(feature = "rumqttc")]
#[rstest]
fn rumqttc_client_is_a_publisher() {
    assert_impl_all!(rumqttc::AsyncClient: Publisher);
}
