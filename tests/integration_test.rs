use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use devgate::{
    evaluate, Allowlist, AllowlistEvaluator, AuthorizationOutcome, Evaluate, FeatureFlag,
    GateOptions, GuardConfig, LogSink, MemorySink, ProfilerGate, RequestContext, ReverseResolver,
    RouteDecision, RouteGate, Severity, StaticResolver,
};

/// Resolver double that fails the test if it is ever consulted.
struct NoDns;

impl ReverseResolver for NoDns {
    fn reverse(&self, ip: IpAddr) -> Option<String> {
        panic!("unexpected reverse lookup for {ip}");
    }
}

/// Resolver double that records lookups and answers from a table.
#[derive(Default)]
struct RecordingResolver {
    lookups: AtomicUsize,
    table: StaticResolver,
}

impl RecordingResolver {
    fn answering(ip: &str, hostname: &str) -> Self {
        Self {
            lookups: AtomicUsize::new(0),
            table: StaticResolver::new().with_entry(ip.parse().unwrap(), hostname),
        }
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ReverseResolver for RecordingResolver {
    fn reverse(&self, ip: IpAddr) -> Option<String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.table.reverse(ip)
    }
}

/// Evaluator spy counting how often a gate asked for a decision.
struct SpyEvaluator<E> {
    inner: E,
    calls: AtomicUsize,
}

impl<E> SpyEvaluator<E> {
    fn new(inner: E) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<E: Evaluate> Evaluate for SpyEvaluator<E> {
    fn evaluate(&self, client_ip: &str) -> AuthorizationOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.evaluate(client_ip)
    }
}

fn default_evaluator() -> AllowlistEvaluator<StaticResolver> {
    AllowlistEvaluator::with_resolver(
        Arc::new(GuardConfig::default().allowlist()),
        StaticResolver::new(),
    )
}

#[test]
fn exact_entries_authorize_without_dns() {
    let ips = ["127.0.0.1", "::1", "192.168.1.1", "2001:db8::7"];
    let hosts = ["*"];

    for client in ips {
        let outcome = evaluate(client, &ips[..], &hosts[..], &NoDns);
        assert!(outcome.authorized, "{client} should be authorized");
        assert!(outcome.resolved_hostname.is_none());
    }
}

#[test]
fn cidr_range_authorizes() {
    let allowlist = Allowlist::new(["192.168.0.0/16", "fd00::/8"], Vec::<String>::new());

    assert!(allowlist.check("192.168.45.100", &NoDns).authorized);
    assert!(allowlist.check("fd12:3456::1", &NoDns).authorized);
}

#[test]
fn default_config_denies_private_address_after_lookup() {
    let resolver = RecordingResolver::default();
    let ips = ["127.0.0.1", "::1", "localhost"];
    let hosts: [&str; 0] = [];

    let outcome = evaluate("10.0.0.1", &ips[..], &hosts[..], &resolver);

    assert!(!outcome.authorized);
    assert_eq!(resolver.lookups(), 1);
}

#[test]
fn hostname_pattern_scenario() {
    let resolver = RecordingResolver::answering("203.0.113.8", "host.example.com");
    let ips: [&str; 0] = [];
    let hosts = ["*.example.com"];

    let outcome = evaluate("203.0.113.8", &ips[..], &hosts[..], &resolver);

    assert!(outcome.authorized);
    assert_eq!(outcome.resolved_hostname.as_deref(), Some("host.example.com"));
}

#[test]
fn failed_lookup_denies() {
    let resolver = RecordingResolver::default();
    let allowlist = Allowlist::new(["127.0.0.1"], ["*"]);

    let outcome = allowlist.check("198.51.100.1", &resolver);

    assert_eq!(outcome, AuthorizationOutcome::denied(None));
    assert_eq!(resolver.lookups(), 1);
}

#[test]
fn hostname_patterns_are_case_sensitive() {
    let resolver = RecordingResolver::answering("203.0.113.8", "HOST.EXAMPLE.COM");
    let allowlist = Allowlist::new(Vec::<String>::new(), ["*.example.com"]);

    assert!(!allowlist.check("203.0.113.8", &resolver).authorized);
}

#[test]
fn repeated_evaluation_is_stable() {
    let resolver = StaticResolver::new().with_entry("203.0.113.8".parse().unwrap(), "a.dev.local");
    let evaluator = AllowlistEvaluator::with_resolver(
        Arc::new(Allowlist::new(["10.0.0.0/8"], ["*.dev.local"])),
        resolver,
    );

    for client in ["10.1.2.3", "203.0.113.8", "8.8.8.8", "garbage"] {
        let first = evaluator.evaluate(client);
        for _ in 0..50 {
            assert_eq!(evaluator.evaluate(client), first);
        }
    }
}

#[test]
fn evaluator_is_shared_across_threads() {
    let evaluator = Arc::new(default_evaluator());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let evaluator = Arc::clone(&evaluator);
            std::thread::spawn(move || {
                let allowed = evaluator.evaluate("127.0.0.1").authorized;
                let denied = evaluator.evaluate(&format!("10.0.0.{i}")).authorized;
                (allowed, denied)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), (true, false));
    }
}

#[test]
fn soft_gate_denial_logs_one_info_entry() {
    let sink = Arc::new(MemorySink::new());
    let gate = ProfilerGate::with_sink(default_evaluator(), GateOptions::default(), Arc::clone(&sink));
    let mut ctx = RequestContext::new("req-1", Some("10.0.0.1".to_string()));

    gate.apply(&mut ctx);

    assert_eq!(ctx.flag(FeatureFlag::Profiler), Some(false));
    assert_eq!(ctx.flag(FeatureFlag::DebugToolbar), Some(false));
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.count(Severity::Info), 1);
    assert!(sink.entries()[0].message.contains("10.0.0.1"));
}

#[test]
fn soft_gate_denial_is_silent_when_logging_disabled() {
    let sink = MemorySink::new();
    let gate = ProfilerGate::with_sink(
        default_evaluator(),
        GateOptions {
            log_blocked_attempts: false,
        },
        &sink,
    );
    let mut ctx = RequestContext::new("req-1", Some("10.0.0.1".to_string()));

    gate.apply(&mut ctx);

    assert_eq!(ctx.flag(FeatureFlag::Profiler), Some(false));
    assert!(sink.is_empty());
}

#[test]
fn soft_gate_authorized_leaves_flags_unset() {
    let sink = MemorySink::new();
    let gate = ProfilerGate::with_sink(default_evaluator(), GateOptions::default(), &sink);
    let mut ctx = RequestContext::new("req-1", Some("::1".to_string()));

    gate.apply(&mut ctx);

    for flag in FeatureFlag::ALL {
        assert!(!ctx.has_flag(flag));
    }
    assert!(sink.is_empty());
}

#[test]
fn soft_gate_ignores_sub_requests() {
    let sink = MemorySink::new();
    let spy = SpyEvaluator::new(default_evaluator());
    let gate = ProfilerGate::with_sink(&spy, GateOptions::default(), &sink);
    let mut ctx = RequestContext::sub_request("req-1", Some("10.0.0.1".to_string()));

    assert!(gate.apply(&mut ctx).is_none());

    assert_eq!(spy.calls(), 0);
    assert!(sink.is_empty());
    assert!(!ctx.has_flag(FeatureFlag::Profiler));
}

#[test]
fn hard_gate_skips_unrestricted_routes() {
    let spy = SpyEvaluator::new(default_evaluator());
    let sink = MemorySink::new();
    let gate = RouteGate::with_sink(&spy, GateOptions::default(), &sink);

    for client in ["10.0.0.1", "127.0.0.1", "unknown"] {
        assert_eq!(gate.decide(false, client), RouteDecision::Unrestricted);
        assert!(gate.enforce(false, client).is_ok());
    }

    assert_eq!(spy.calls(), 0);
    assert!(sink.is_empty());
}

#[test]
fn hard_gate_denies_restricted_route() {
    let sink = MemorySink::new();
    let gate = RouteGate::with_sink(default_evaluator(), GateOptions::default(), &sink);

    let err = gate.enforce(true, "10.0.0.1").unwrap_err();

    assert!(err.to_string().contains("restricted to the developer whitelist"));
    assert_eq!(err.status(), 403);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.count(Severity::Warning), 1);
    assert_eq!(
        sink.entries()[0].message,
        "Restricted route access denied for 10.0.0.1 (reverse: unknown)"
    );
}

#[test]
fn hard_gate_denial_without_logging() {
    let sink = MemorySink::new();
    let gate = RouteGate::with_sink(
        default_evaluator(),
        GateOptions {
            log_blocked_attempts: false,
        },
        &sink,
    );

    assert!(gate.enforce(true, "10.0.0.1").is_err());
    assert!(sink.is_empty());
}

#[test]
fn hard_gate_allows_listed_client() {
    let gate = RouteGate::with_sink(default_evaluator(), GateOptions::default(), MemorySink::new());

    assert!(gate.enforce(true, "127.0.0.1").is_ok());
    assert!(matches!(gate.decide(true, "::1"), RouteDecision::Allowed(_)));
}

#[test]
fn host_supplied_sink_receives_entries() {
    struct Forwarder(std::sync::Mutex<Vec<String>>);

    impl LogSink for Forwarder {
        fn record(&self, entry: devgate::BlockedAttempt) {
            self.0.lock().unwrap().push(format!("{}: {}", entry.severity, entry.message));
        }
    }

    let sink = Forwarder(std::sync::Mutex::new(Vec::new()));
    let gate = RouteGate::with_sink(default_evaluator(), GateOptions::default(), &sink);
    let _ = gate.enforce(true, "192.0.2.1");

    let lines = sink.0.lock().unwrap();
    assert_eq!(
        *lines,
        vec!["warning: Restricted route access denied for 192.0.2.1 (reverse: unknown)".to_string()]
    );
}

#[test]
fn yaml_config_drives_both_gates() {
    let config = GuardConfig::from_yaml_str(
        r#"
allowed_ips: ["localhost", "192.168.0.0/16"]
allowed_hosts: ["*.corp.example"]
log_blocked_attempts: false
"#,
    )
    .unwrap();

    let resolver = StaticResolver::new().with_entry("203.0.113.4".parse().unwrap(), "vpn7.corp.example");
    let evaluator = Arc::new(AllowlistEvaluator::with_resolver(Arc::new(config.allowlist()), resolver));
    let sink = Arc::new(MemorySink::new());
    let routes = RouteGate::with_sink(Arc::clone(&evaluator), config.gate_options(), Arc::clone(&sink));

    assert!(routes.enforce(true, "127.0.0.1").is_ok());
    assert!(routes.enforce(true, "::1").is_ok());
    assert!(routes.enforce(true, "192.168.3.3").is_ok());
    assert!(routes.enforce(true, "203.0.113.4").is_ok());
    assert!(routes.enforce(true, "203.0.113.5").is_err());
    assert!(sink.is_empty());
}
