use chanflow::FlowError;
use chanflow::flow::{
    CancellationSignal, Jitter, Stream, StreamReader, Task, gather_first, generate, merge, search,
    split,
};
use std::time::Duration;

fn source(items: Vec<u32>) -> StreamReader<u32> {
    let s = Stream::unbounded();
    for i in items {
        s.write(i).unwrap();
    }
    s.close();
    s.reader()
}

/// Stream fed by a thread with small pauses, so several inputs interleave.
fn slow_source(tag: u32, n: u32) -> StreamReader<(u32, u32)> {
    let s = Stream::unbounded();
    let r = s.reader();
    std::thread::spawn(move || {
        let _close = s.close_on_drop();
        for i in 0..n {
            s.write((tag, i)).unwrap();
            std::thread::sleep(Duration::from_millis(1));
        }
    });
    r
}

// --- merge ---

#[test]
fn test_merge_output_is_union_of_inputs() {
    let (out, task) = merge(vec![
        source(vec![1, 2, 3]),
        source(vec![10, 20]),
        source(vec![]),
        source(vec![100]),
    ])
    .unwrap();
    let mut got = out.drain();
    task.join().unwrap();
    got.sort();
    assert_eq!(got, vec![1, 2, 3, 10, 20, 100]);
}

#[test]
fn test_merge_preserves_per_input_order() {
    let inputs = (0..4).map(|tag| slow_source(tag, 25)).collect();
    let (out, task) = merge(inputs).unwrap();
    let got = out.drain();
    task.join().unwrap();

    assert_eq!(got.len(), 100);
    for tag in 0..4 {
        let seq: Vec<u32> = got
            .iter()
            .filter(|(t, _)| *t == tag)
            .map(|(_, i)| *i)
            .collect();
        assert_eq!(seq, (0..25).collect::<Vec<_>>());
    }
}

// --- split ---

#[test]
fn test_split_round_robin_positions() {
    let len = 11;
    let n = 3;
    let (outs, task) = split(source((0..len).collect()), n).unwrap();
    let drained: Vec<Vec<u32>> = outs.iter().map(|o| o.drain()).collect();
    task.join().unwrap();

    assert_eq!(drained.iter().map(Vec::len).sum::<usize>(), len as usize);
    for (i, out) in drained.iter().enumerate() {
        let expected: Vec<u32> = (i as u32..len).step_by(n).collect();
        assert_eq!(out, &expected, "output {i}");
    }
}

#[test]
fn test_split_more_outputs_than_items() {
    let (outs, _task) = split(source(vec![7]), 4).unwrap();
    let lens: Vec<usize> = outs.iter().map(|o| o.drain().len()).collect();
    assert_eq!(lens, vec![1, 0, 0, 0]);
}

#[test]
fn test_split_zero_outputs_rejected() {
    let err = split(source(vec![1]), 0).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<FlowError>(),
        Some(FlowError::InvalidArgument(_))
    ));
}

#[test]
fn test_split_then_merge_round_trip_keeps_multiset() {
    let (outs, split_task) = split(source((0..50).collect()), 5).unwrap();
    let (merged, merge_task) = merge(outs).unwrap();
    let mut got = merged.drain();
    split_task.join().unwrap();
    merge_task.join().unwrap();
    got.sort();
    assert_eq!(got, (0..50).collect::<Vec<_>>());
}

// --- generator ---

#[test]
fn test_generator_exact_sequence() {
    let cancel = CancellationSignal::new();
    let jitter = Jitter::seeded(1, Duration::from_millis(3));
    let (out, task) = generate("Ann", Some(4), &cancel, jitter).unwrap();
    assert_eq!(out.drain(), vec!["Ann 0", "Ann 1", "Ann 2", "Ann 3"]);
    task.join().unwrap();
}

#[test]
fn test_generator_manual_cancel_ends_with_single_farewell() {
    let cancel = CancellationSignal::new();
    let jitter = Jitter::seeded(3, Duration::from_millis(20));
    let (out, task) = generate("Joe", Some(500), &cancel, jitter).unwrap();
    assert_eq!(out.recv().as_deref(), Some("Joe 0"));
    cancel.trigger();
    let rest = out.drain();
    task.join().unwrap();

    let farewells = rest.iter().filter(|s| s.ends_with("says bye!")).count();
    assert_eq!(farewells, 1);
    assert_eq!(rest.last().map(String::as_str), Some("Joe says bye!"));
    for (i, item) in rest[..rest.len() - 1].iter().enumerate() {
        assert_eq!(item, &format!("Joe {}", i + 1));
    }
}

// --- gather ---

#[test]
fn test_gather_all_producers_within_timeout() {
    let items = gather_first(3, Duration::from_secs(5), |out: &Stream<String>, cancel| {
        for i in 0..3 {
            let out = out.clone();
            let cancel = cancel.clone();
            let _detached = Task::spawn(format!("p{i}"), move || {
                cancel.sleep(Duration::from_millis(10 * i));
                out.write(format!("result {i}"))?;
                Ok(())
            })
            .unwrap();
        }
    })
    .unwrap();
    assert_eq!(items.len(), 3);
}

#[test]
fn test_gather_times_out_when_producers_too_slow() {
    let err = gather_first(3, Duration::from_millis(30), |out: &Stream<u8>, _cancel| {
        for i in 0..3 {
            let out = out.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(300));
                // Nobody reads this any more; the write must still succeed without blocking.
                out.write(i).unwrap();
            });
        }
    })
    .unwrap_err();
    match err {
        FlowError::TimedOut { wanted, received } => {
            assert_eq!(wanted, 3);
            assert!(received < 3);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    // Give the abandoned producers time to write into the orphaned stream.
    std::thread::sleep(Duration::from_millis(400));
}

#[test]
fn test_search_timeout_shorter_than_every_delay() {
    let sources: Vec<String> = ["Wikipedia", "Quora", "Everything2"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    // Delays are drawn from a 30 s window; a 1 ms timeout cannot collect all three.
    let err = search(
        "Jupyter",
        &sources,
        Jitter::seeded(11, Duration::from_secs(30)),
        Duration::from_millis(1),
        |_| {},
    )
    .unwrap_err();
    assert!(matches!(err, FlowError::TimedOut { wanted: 3, .. }));
}

#[test]
fn test_search_all_sources_answer() {
    let sources: Vec<String> = vec!["A".into(), "B".into(), "C".into()];
    let mut results = search(
        "rust",
        &sources,
        Jitter::seeded(5, Duration::from_millis(20)),
        Duration::from_secs(5),
        |_| {},
    )
    .unwrap();
    results.sort();
    assert_eq!(
        results,
        vec![
            "Result from A for rust",
            "Result from B for rust",
            "Result from C for rust"
        ]
    );
}

// --- stream ---

#[test]
fn test_close_twice_single_end_of_stream() {
    let s = Stream::unbounded();
    let r = s.reader();
    s.write("x").unwrap();
    s.close();
    s.close();
    assert_eq!(r.drain(), vec!["x"]);
    assert!(r.recv().is_none());
}

#[test]
fn test_many_writers_one_reader() {
    let s = Stream::unbounded();
    let r = s.reader();
    let handles: Vec<_> = (0..8)
        .map(|w| {
            let s = s.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    s.write(w * 1000 + i).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    s.close();
    assert_eq!(r.drain().len(), 800);
}
