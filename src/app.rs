use crate::category::CategoryRegistry;
use crate::chat::{spawn_chat, ChatError, HttpChatRelay};
use crate::clock::{Clock, SystemClock};
use crate::config::{
    init_logging, load_settings, project_paths, save_settings_atomic, Cli, Paths, Settings,
};
use crate::feed::{parse_line, spawn_tail, FeedMsg};
use crate::growth::RoomGrowth;
use crate::input::{collect_input_nonblocking, map_event_to_action, Scene, UserAction};
use crate::model::TaskStatus;
use crate::pet::Pet;
use crate::render::{draw_help, draw_panel, draw_room, Terminal, Viewport};
use crate::routine::routine_index;
use anyhow::Context;
use std::sync::{
    mpsc::{self, Receiver, Sender},
    Arc,
};
use std::time::{Duration, Instant};

const CHAT_INPUT_MAX: usize = 100;

type ChatReply = Result<String, ChatError>;

struct ChatLink {
    runtime: tokio::runtime::Runtime,
    relay: Arc<HttpChatRelay>,
    tx: Sender<ChatReply>,
    rx: Receiver<ChatReply>,
}

impl ChatLink {
    fn connect(url: &str) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .context("starting chat runtime")?;
        let relay = Arc::new(HttpChatRelay::new(url)?);
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            runtime,
            relay,
            tx,
            rx,
        })
    }
}

pub(crate) struct App {
    stored_settings: Settings,
    settings: Settings,
    paths: Paths,
    pet: Pet<SystemClock>,
    categories: CategoryRegistry,
    growth: RoomGrowth,
    term: Terminal,
    scene: Scene,
    chat_input: String,
    events: Option<Receiver<FeedMsg>>,
    chat: Option<ChatLink>,
    should_quit: bool,
}

impl App {
    fn init(cli: &Cli) -> anyhow::Result<Self> {
        let paths = project_paths()?;
        init_logging(&paths.log_path)?;

        let stored_settings = load_settings(&paths.settings_path);
        let settings = cli.apply(stored_settings.clone());
        tracing::info!(seed = settings.seed, "starting");

        let categories = CategoryRegistry::load(paths.categories_path.clone());
        let growth = RoomGrowth::load(paths.growth_path.clone());
        let pet = Pet::new(SystemClock, settings.seed);

        let events = settings.events_path.clone().map(|path| {
            let (tx, rx) = mpsc::channel();
            spawn_tail(path, true, tx);
            rx
        });

        let chat = match settings.chat_url.as_deref() {
            Some(url) => match ChatLink::connect(url) {
                Ok(link) => Some(link),
                Err(err) => {
                    tracing::warn!(error = %err, "chat disabled");
                    None
                }
            },
            None => None,
        };

        let term = Terminal::begin()?;

        Ok(Self {
            stored_settings,
            settings,
            paths,
            pet,
            categories,
            growth,
            term,
            scene: Scene::Main,
            chat_input: String::new(),
            events,
            chat,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let motion_step = Duration::from_millis(self.pet.rules.motion_tick_ms);
        let needs_step = Duration::from_millis(self.pet.rules.needs_tick_ms);

        let mut last_frame = Instant::now();
        let mut motion_accum = Duration::ZERO;
        let mut needs_accum = Duration::ZERO;

        while !self.should_quit {
            self.term.resize_if_needed()?;

            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event_to_action(self.scene, &ev) {
                    self.apply(action);
                }
                if self.should_quit {
                    break;
                }
            }

            self.drain_task_events();
            self.drain_chat_replies();

            // fixed-step core
            let now = Instant::now();
            let real_dt = now.saturating_duration_since(last_frame);
            last_frame = now;
            motion_accum = motion_accum.saturating_add(real_dt);
            needs_accum = needs_accum.saturating_add(real_dt);

            while motion_accum >= motion_step {
                self.pet.motion_tick();
                motion_accum = motion_accum.saturating_sub(motion_step);
            }
            while needs_accum >= needs_step {
                self.pet.decay_tick();
                needs_accum = needs_accum.saturating_sub(needs_step);
            }

            self.render_frame()?;
            spin_sleep(frame_dt, Instant::now());
        }

        self.term.end()?;
        save_settings_atomic(&self.paths.settings_path, &self.stored_settings)?;
        tracing::info!("bye");
        Ok(())
    }

    fn apply(&mut self, action: UserAction) {
        let outcome = match action {
            UserAction::Quit => {
                self.should_quit = true;
                return;
            }
            UserAction::HelpToggle => {
                self.scene = if self.scene == Scene::Help {
                    Scene::Main
                } else {
                    Scene::Help
                };
                return;
            }
            UserAction::ChatOpen => {
                self.scene = Scene::Chat;
                self.chat_input.clear();
                return;
            }
            UserAction::ChatChar(ch) => {
                if self.chat_input.chars().count() < CHAT_INPUT_MAX {
                    self.chat_input.push(ch);
                }
                return;
            }
            UserAction::ChatBackspace => {
                self.chat_input.pop();
                return;
            }
            UserAction::ChatCancel => {
                self.scene = Scene::Main;
                self.chat_input.clear();
                return;
            }
            UserAction::ChatSend => {
                self.scene = Scene::Main;
                let text = std::mem::take(&mut self.chat_input);
                self.send_chat(&text);
                return;
            }
            UserAction::Feed => self.pet.feed(),
            UserAction::Pet => self.pet.pet(),
            UserAction::Poke => self.pet.react_to_click(),
            UserAction::LightToggle => self.pet.toggle_light(),
            UserAction::Nap => match routine_index("nap") {
                Some(nap) => self.pet.request_routine(nap),
                None => return,
            },
        };
        tracing::debug!(?action, ?outcome, "user action");
    }

    fn send_chat(&mut self, text: &str) {
        let Some(message) = self.pet.begin_chat(text) else {
            return;
        };
        match &self.chat {
            Some(link) => spawn_chat(
                link.runtime.handle(),
                Arc::clone(&link.relay),
                message,
                link.tx.clone(),
            ),
            None => {
                self.pet.finish_chat(Err::<String, _>("no chat endpoint configured"));
            }
        }
    }

    fn drain_task_events(&mut self) {
        let Some(rx) = &self.events else {
            return;
        };
        let msgs: Vec<FeedMsg> = rx.try_iter().collect();
        for msg in msgs {
            let line = match msg {
                FeedMsg::Line(line) => line,
                FeedMsg::Down => {
                    self.pet.feed_lost();
                    continue;
                }
                FeedMsg::Up => {
                    tracing::info!("task feed back");
                    continue;
                }
            };
            match parse_line(&line, &mut self.categories) {
                Ok(ev) => {
                    self.pet.on_task_event_at(
                        ev.status,
                        ev.summary.as_deref(),
                        &ev.category,
                        ev.target,
                    );
                    if ev.status == TaskStatus::Done {
                        let now = self.pet.clock.now_ms();
                        self.growth.record(&ev.category, now);
                        self.growth.check_upgrades(now);
                    }
                }
                Err(err) => tracing::debug!(error = %err, "task event dropped"),
            }
        }
    }

    fn drain_chat_replies(&mut self) {
        let Some(link) = &self.chat else {
            return;
        };
        let replies: Vec<ChatReply> = link.rx.try_iter().collect();
        for reply in replies {
            self.pet.finish_chat(reply);
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let bg = crossterm::style::Color::Black;
        self.term.cur.clear(bg);

        let vp = Viewport::beside_panel(self.term.cols, self.term.rows);
        let now = self.pet.now();
        draw_room(
            &mut self.term.cur,
            vp,
            &self.pet.room,
            &self.pet.state,
            &self.settings,
            now,
        );

        let chat_line = (self.scene == Scene::Chat).then_some(self.chat_input.as_str());
        draw_panel(
            &mut self.term.cur,
            &self.pet.state,
            &self.settings,
            self.growth.upgrades(),
            chat_line,
        );

        if self.scene == Scene::Help {
            draw_help(&mut self.term.cur);
        }

        self.term.present()?;
        Ok(())
    }
}

pub(crate) fn run(cli: Cli) -> anyhow::Result<()> {
    let mut app = App::init(&cli)?;
    let result = app.run();
    if result.is_err() {
        app.term.end().ok();
    }
    result
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
