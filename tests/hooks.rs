use std::{
    cell::{Cell, RefCell},
    time::Duration,
};

use dioxus::dioxus_core::{NoOpMutations, VirtualDom};
use statecraft::prelude::*;
use tokio::sync::oneshot;

/// Let effects, tasks and the renders they cause run until nothing is left
async fn settle(dom: &mut VirtualDom) {
    for _ in 0..8 {
        let _ = tokio::time::timeout(Duration::from_millis(20), dom.wait_for_work()).await;
        dom.render_immediate(&mut NoOpMutations);
    }
}

fn mount(app: fn() -> Element) -> VirtualDom {
    let mut dom = VirtualDom::new(app);
    dom.rebuild_in_place();
    dom
}

fn entries(items: &[(&str, u32)]) -> Vec<Entry<u32>> {
    items.iter().map(|(k, v)| Entry::new(*k, *v)).collect()
}

type Frame = (Vec<String>, Vec<(String, bool)>);

thread_local! {
    static LIST: Cell<Option<Signal<Vec<Entry<u32>>>>> = const { Cell::new(None) };
    static FRAMES: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
    static SYNCED: RefCell<Vec<Vec<u32>>> = const { RefCell::new(Vec::new()) };
    static RENDERED: RefCell<Vec<(String, bool, bool)>> = const { RefCell::new(Vec::new()) };
}

fn set_list(dom: &VirtualDom, items: &[(&str, u32)]) {
    let mut list = LIST.get().expect("list mounted");
    let items = entries(items);
    dom.in_runtime(|| list.set(items));
}

#[allow(non_snake_case)]
fn ListOwner() -> Element {
    let list = use_signal(|| entries(&[("a", 1), ("b", 2)]));
    LIST.set(Some(list));
    rsx! {
        Tracked { entries: list() }
    }
}

#[component]
fn Tracked(entries: ReadOnlySignal<Vec<Entry<u32>>>) -> Element {
    let on_delete = use_callback(|_: DeleteEvent<u32>| DeleteDecision::Deny);
    let on_sync = use_callback(|values: Vec<u32>| SYNCED.with_borrow_mut(|s| s.push(values)));
    let items = helper_hooks::use_keyed_sync(entries, None, Some(on_delete), Some(on_sync));

    let external = entries.read().iter().map(|e| e.key.to_string()).collect();
    let frame = items
        .read()
        .iter()
        .map(|item| (item.key.to_string(), item.unsync))
        .collect();
    FRAMES.with_borrow_mut(|f| f.push((external, frame)));
    rsx! {}
}

#[tokio::test]
async fn keyed_sync_flags_follow_the_latest_entries_on_every_render() {
    let mut dom = mount(ListOwner);
    settle(&mut dom).await;
    assert_eq!(SYNCED.take(), vec![vec![1, 2]]);

    set_list(&dom, &[("b", 2), ("c", 3)]);
    settle(&mut dom).await;

    let frames = FRAMES.take();
    for (external, items) in &frames {
        for (key, unsync) in items {
            assert_eq!(*unsync, !external.contains(key), "{key} in {frames:?}");
        }
    }
    let rendered: Vec<_> = frames.iter().map(|(_, items)| items.clone()).collect();
    let owned = |items: &[(&str, bool)]| -> Vec<(String, bool)> {
        items.iter().map(|(k, u)| (k.to_string(), *u)).collect()
    };
    assert!(rendered.contains(&owned(&[("a", true), ("b", false)])));
    assert_eq!(
        rendered.last(),
        Some(&owned(&[("a", true), ("c", false), ("b", false)]))
    );
    assert_eq!(SYNCED.take(), vec![vec![1, 3, 2]]);
}

#[allow(non_snake_case)]
fn MapOwner() -> Element {
    let list = use_signal(|| entries(&[("a", 1), ("b", 2)]));
    LIST.set(Some(list));
    rsx! {
        KeyedMap::<u32> {
            entries: list(),
            item: move |item: MapItem<u32>| {
                let key = item.key.to_string();
                let absent = !list.peek().iter().any(|e| e.key == item.key);
                RENDERED.with_borrow_mut(|r| r.push((key, item.unsync, absent)));
                rsx! { "{item.value}" }
            },
        }
    }
}

#[tokio::test]
async fn keyed_map_renders_local_entries_in_local_order() {
    let mut dom = mount(MapOwner);
    settle(&mut dom).await;
    assert_eq!(last_rendered_keys(&RENDERED.take(), 2), vec!["a", "b"]);

    set_list(&dom, &[("b", 2), ("c", 3)]);
    settle(&mut dom).await;

    let calls = RENDERED.take();
    assert!(calls.iter().all(|(_, unsync, absent)| unsync == absent));
    assert_eq!(last_rendered_keys(&calls, 2), vec!["c", "b"]);
}

fn last_rendered_keys(calls: &[(String, bool, bool)], n: usize) -> Vec<&str> {
    calls[calls.len() - n..].iter().map(|(k, _, _)| k.as_str()).collect()
}

thread_local! {
    static PAGE: Cell<Option<Signal<u32>>> = const { Cell::new(None) };
    static LOADS: RefCell<Vec<(LoadStatus, Option<u32>)>> = const { RefCell::new(Vec::new()) };
    static PRODUCED: Cell<u32> = const { Cell::new(0) };
}

#[allow(non_snake_case)]
fn Loader() -> Element {
    let page = use_signal(|| 0u32);
    PAGE.set(Some(page));
    let current = page();
    let loaded = helper_hooks::use_loaded_state(
        current,
        move || {
            PRODUCED.set(PRODUCED.get() + 1);
            Produced::Sync(current * 10)
        },
        LoadOptions::default(),
    );
    LOADS.with_borrow_mut(|l| l.push((loaded.status(), loaded.value())));
    rsx! {}
}

#[tokio::test]
async fn loaded_state_loads_on_mount_and_on_deps_change() {
    let mut dom = mount(Loader);
    settle(&mut dom).await;
    assert_eq!(PRODUCED.get(), 1);

    let mut page = PAGE.get().expect("page mounted");
    dom.in_runtime(|| page.set(1));
    settle(&mut dom).await;

    let loads = LOADS.take();
    assert_eq!(loads.first(), Some(&(LoadStatus::Idle, None)));
    assert!(loads.contains(&(LoadStatus::Ready, Some(0))));
    assert_eq!(loads.last(), Some(&(LoadStatus::Ready, Some(10))));
    assert_eq!(PRODUCED.get(), 2);

    // Same deps, no reload
    dom.in_runtime(|| page.set(1));
    settle(&mut dom).await;
    assert_eq!(PRODUCED.get(), 2);
}

thread_local! {
    static GATE: RefCell<Option<oneshot::Receiver<()>>> = const { RefCell::new(None) };
    static PENDING: RefCell<Vec<bool>> = const { RefCell::new(Vec::new()) };
}

#[allow(non_snake_case)]
fn Saver() -> Element {
    let (pending, save) = helper_hooks::use_transitioned(|gate: oneshot::Receiver<()>| async move {
        let _ = gate.await;
    });
    use_effect(move || {
        if let Some(gate) = GATE.take() {
            save.call(gate);
        }
    });
    PENDING.with_borrow_mut(|p| p.push(pending()));
    rsx! {}
}

#[tokio::test]
async fn transitioned_call_is_pending_until_it_finishes() {
    let (open, gate) = oneshot::channel();
    GATE.set(Some(gate));

    let mut dom = mount(Saver);
    settle(&mut dom).await;
    assert_eq!(PENDING.with_borrow(|p| p.last().copied()), Some(true));

    let _ = open.send(());
    settle(&mut dom).await;

    let flags = PENDING.take();
    assert_eq!(flags.first(), Some(&false));
    assert_eq!(flags.last(), Some(&false));
    assert!(flags.contains(&true));
}
