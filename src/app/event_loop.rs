use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::event;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, Event};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, ToastLevel, update};
use crate::persist::{JsonFileStore, Note, NoteStore, load_or_welcome};
use crate::watcher::StoreWatcher;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read, or if terminal
    /// initialization or the event loop hits an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let load_scope = crate::perf::scope("app.load_notes");
        let store = JsonFileStore::new(&self.store_path);
        let notes = load_or_welcome(&store, Utc::now())
            .with_context(|| format!("Failed to load notes from {}", self.store_path.display()))?;
        drop(load_scope);

        // Initialize terminal
        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal: jotmark requires an interactive terminal")?;
        let size = terminal.size()?;
        drop(init_scope);
        execute!(stdout(), EnableBracketedPaste)?;

        let mut model = self.initial_model(notes, (size.width, size.height));
        crate::perf::log_event(
            "init.model",
            format!(
                "terminal={}x{} notes={} surface={:?} store={}",
                size.width,
                size.height,
                model.notes.len(),
                self.surface,
                self.store_path.display()
            ),
        );

        let result = self.event_loop(&mut terminal, &mut model, &store);

        // Restore terminal
        let _ = execute!(stdout(), DisableBracketedPaste);
        ratatui::restore();

        result
    }

    pub(super) fn initial_model(&self, notes: Vec<Note>, size: (u16, u16)) -> Model {
        let mut model = Model::new(notes, self.surface, self.debounce_ms, size);
        model.preview_visible = self.preview_visible;
        if let Some(id) = &self.initial_note
            && !model.open_note_by_id(id)
        {
            model.show_toast(ToastLevel::Warning, format!("No note with id {id}"));
        }
        model.refresh_preview();
        model
    }

    fn event_loop(
        &self,
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        store: &dyn NoteStore,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut store_watcher = if self.watch_enabled {
            match Self::make_store_watcher(&self.store_path) {
                Ok(watcher) => {
                    crate::perf::log_event(
                        "watcher.start",
                        format!("path={}", watcher.store_path().display()),
                    );
                    Some(watcher)
                }
                Err(err) => {
                    model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                    crate::perf::log_event(
                        "watcher.error",
                        format!("failed path={} err={err}", self.store_path.display()),
                    );
                    None
                }
            }
        } else {
            None
        };
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = elapsed_ms(start);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                crate::perf::log_event(
                    "event.resize.apply",
                    format!("frame={frame_idx} width={width} height={height}"),
                );
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            if store_watcher
                .as_mut()
                .is_some_and(StoreWatcher::take_change_ready)
            {
                model.now_ms = now_ms;
                *model = update(std::mem::take(model), Message::StoreChanged);
                Self::handle_message_side_effects(model, store, &Message::StoreChanged);
                needs_render = true;
            }

            // Handle events
            let poll_ms = if needs_render || model.session.caret_pending() {
                0
            } else if resize_debouncer.is_pending() || model.session.has_unsaved_changes() {
                10
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so debouncers use accurate times.
                let event_ms = elapsed_ms(start);
                if Self::dispatch(&event::read()?, model, store, event_ms, &mut resize_debouncer) {
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                let mut drained = 0_u32;
                while !model.should_quit && event::poll(Duration::from_millis(0))? {
                    let drain_ms = elapsed_ms(start);
                    if Self::dispatch(&event::read()?, model, store, drain_ms, &mut resize_debouncer)
                    {
                        drained += 1;
                        needs_render = true;
                    }
                }
                if drained > 0 {
                    crate::perf::log_event(
                        "event.drain",
                        format!("frame={frame_idx} drained={drained}"),
                    );
                }
            }

            // Deferred caret work lands before the frame that shows it.
            if Self::tick(model, store, elapsed_ms(start)) {
                needs_render = true;
            }

            if model.should_quit {
                break;
            }

            if needs_render {
                frame_idx += 1;
                model.ensure_caret_visible();
                let draw_start = Instant::now();
                terminal.draw(|frame| Self::view(model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }
        }
        Ok(())
    }

    /// Turn one terminal event into a message and run it. Returns whether a
    /// message was produced.
    pub(super) fn dispatch(
        event: &Event,
        model: &mut Model,
        store: &dyn NoteStore,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> bool {
        let Some(msg) = Self::handle_event(event, model, now_ms, resize_debouncer) else {
            return false;
        };
        if crate::perf::is_debug_log_enabled() {
            crate::perf::log_event("event.message", format!("msg={msg:?}"));
        }
        let side_msg = msg.clone();
        model.now_ms = now_ms;
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, store, &side_msg);
        true
    }
}
