use std::sync::{Arc, Mutex};

use pagelog_interceptor::{
    ArgValue, CaptureRegistry, Channel, ConsoleMethod, ConsoleSink, ErrorEvent, InjectOutcome,
    Interceptor, InterceptorConfig, PageContext, read_logs,
};

fn injected() -> (PageContext, Interceptor) {
    let ctx = PageContext::new();
    let interceptor =
        Interceptor::with_registry(InterceptorConfig::default(), Arc::new(CaptureRegistry::new()));
    assert_eq!(interceptor.inject(&ctx), InjectOutcome::Installed);
    (ctx, interceptor)
}

#[test]
fn reinjection_does_not_duplicate_hooks() {
    let (ctx, interceptor) = injected();

    ctx.console_call(ConsoleMethod::Info, &["first".into()]);
    assert_eq!(interceptor.inject(&ctx), InjectOutcome::AlreadyInjected);
    ctx.console_call(ConsoleMethod::Info, &["second".into()]);

    let logs = read_logs(&ctx);
    assert_eq!(logs.info, vec!["first", "second"]);
    assert_eq!(logs.len(), 2);
}

#[test]
fn channel_routing() {
    let (ctx, _interceptor) = injected();

    ctx.console_call(ConsoleMethod::Log, &["a".into()]);
    ctx.console_call(ConsoleMethod::Info, &["a".into()]);
    ctx.console_call(ConsoleMethod::Warn, &["a".into()]);
    ctx.console_call(ConsoleMethod::Error, &["a".into()]);
    ctx.report_error(&ErrorEvent {
        message: "oops".into(),
        source_url: "http://x/app.js".into(),
        line: 1,
        column: 1,
        error: None,
    });

    let logs = read_logs(&ctx);
    assert_eq!(logs.info, vec!["a", "a"]);
    assert_eq!(logs.warning, vec!["a"]);
    assert_eq!(logs.error, vec!["a", "http://x/app.js - 1:1 - oops"]);
}

#[test]
fn argument_formatting() {
    let (ctx, _interceptor) = injected();
    ctx.console_call(ConsoleMethod::Info, &["hello".into(), ArgValue::from(42)]);
    assert_eq!(read_logs(&ctx).info, vec!["hello 42"]);
}

#[test]
fn error_formatting_with_undefined_error_object() {
    let (ctx, _interceptor) = injected();
    ctx.report_error(&ErrorEvent {
        message: "boom".into(),
        source_url: "http://x/y.js".into(),
        line: 10,
        column: 3,
        error: Some(ArgValue::Undefined),
    });
    assert_eq!(read_logs(&ctx).error, vec!["http://x/y.js - 10:3 - boom"]);
}

#[test]
fn append_only_ordering() {
    let (ctx, _interceptor) = injected();
    let expected: Vec<String> = (0..50).map(|i| format!("msg {i}")).collect();

    for i in 0..50 {
        ctx.console_call(ConsoleMethod::Warn, &["msg".into(), ArgValue::from(i as i64)]);
    }

    assert_eq!(read_logs(&ctx).warning, expected);
}

#[test]
fn channels_are_isolated() {
    let (ctx, _interceptor) = injected();

    for method in ConsoleMethod::ALL {
        let before = read_logs(&ctx);
        ctx.console_call(method, &["x".into()]);
        let after = read_logs(&ctx);

        for channel in Channel::ALL {
            let grew = after.channel(channel).len() - before.channel(channel).len();
            let expected = usize::from(channel == method.channel());
            assert_eq!(grew, expected, "{method:?} changed {channel}");
        }
    }
}

#[test]
fn original_console_still_receives_calls() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let ctx = PageContext::with_console(|method| -> Arc<dyn ConsoleSink> {
        let received = Arc::clone(&received);
        Arc::new(move |args: &[ArgValue]| {
            received.lock().unwrap().push((method, args.to_vec()));
        })
    });
    Interceptor::with_registry(InterceptorConfig::default(), Arc::new(CaptureRegistry::new()))
        .inject(&ctx);

    let obj = ArgValue::from(serde_json::json!({"id": 7}));
    ctx.console_call(ConsoleMethod::Error, &["failed".into(), obj.clone()]);

    assert_eq!(
        *received.lock().unwrap(),
        vec![(ConsoleMethod::Error, vec![ArgValue::from("failed"), obj])]
    );
    assert_eq!(read_logs(&ctx).error, vec![r#"failed {"id":7}"#]);
}

#[test]
fn buffers_are_per_context() {
    let registry = Arc::new(CaptureRegistry::new());
    let interceptor = Interceptor::with_registry(InterceptorConfig::default(), Arc::clone(&registry));
    let a = PageContext::new();
    let b = PageContext::new();
    interceptor.inject(&a);
    interceptor.inject(&b);

    a.console_call(ConsoleMethod::Log, &["only a".into()]);

    assert_eq!(registry.snapshot(a.id()).unwrap().info, vec!["only a"]);
    assert!(registry.snapshot(b.id()).unwrap().is_empty());

    let b_id = b.id();
    drop(b);
    assert!(registry.snapshot(b_id).is_none());
    assert_eq!(registry.context_ids(), vec![a.id()]);
}
