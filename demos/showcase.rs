use statecraft::prelude::*;
use statecraft::utils::{async_sleep, init_logger, log_error_ccstr};

#[derive(Debug, Clone, PartialEq)]
struct Task {
    title: CCStr,
    done: bool,
}

static TITLE: &str = "statecraft showcase";

async fn fetch_tasks(page: u32) -> Result<Vec<Entry<Task>>, CCStr> {
    async_sleep(400).await;
    if page > 3 {
        return Err(log_error_ccstr(format!("page {page} does not exist")));
    }
    Ok((0..5)
        .map(|i| {
            let id = page * 3 + i;
            Entry::new(
                id,
                Task {
                    title: format!("Task #{id}").into(),
                    done: id % 2 == 0,
                },
            )
        })
        .collect())
}

#[allow(non_snake_case)]
fn App() -> Element {
    log::debug!("App reload");

    let mut page = use_signal(|| 0u32);
    let current_page = page();
    let tasks = helper_hooks::use_loaded_state(
        current_page,
        move || Produced::future(fetch_tasks(current_page)),
        LoadOptions::default(),
    );
    let mut saved = use_signal(Vec::<Task>::new);
    let (saving, save) = helper_hooks::use_transitioned(move |values: Vec<Task>| async move {
        async_sleep(200).await;
        log::info!("saved {} tasks", values.len());
        saved.set(values);
    });

    let loaded: LResult<Vec<Entry<Task>>> = tasks.value();
    let (entries, error) = match loaded {
        Some(Ok(entries)) => (entries, None),
        Some(Err(e)) => (Vec::new(), Some(e)),
        None => (Vec::new(), None),
    };

    rsx! {
        document::Title { "{TITLE}" }
        div { id: "app",
            h1 { "Tasks, page {page}" }
            if tasks.is_loading() {
                p { "Loading..." }
            }
            if let Some(e) = error {
                p { color: "red", "{e}" }
            }
            button { onclick: move |_| page += 1, "Next page" }
            button { onclick: move |_| tasks.trigger(), "Reload" }
            if saving() {
                p { "Saving..." }
            }
            p { "{saved.read().len()} tasks saved" }
            ul {
                KeyedMap::<Task> {
                    entries,
                    on_delete: move |event: DeleteEvent<Task>| {
                        if event.entry.value.done {
                            DeleteDecision::Allow
                        } else {
                            log::info!("keeping unfinished task {}", event.entry.key);
                            DeleteDecision::Deny
                        }
                    },
                    on_sync: move |values: Vec<Task>| save.call(values),
                    item: move |item: MapItem<Task>| rsx! {
                        li { class: if item.unsync { "opacity-50" },
                            "{item.value.title}"
                            if item.value.done {
                                " (done)"
                            }
                        }
                    },
                }
            }
        }
    }
}

fn main() {
    init_logger("warn");

    log::info!("starting app");
    dioxus::launch(App);
}
