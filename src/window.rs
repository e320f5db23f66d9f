//! Windowed visualizer.
//!
//! Keyboard stands in for the voice SDK so every visual state can be reached
//! without a live call:
//!
//! | Key        | Event                                        |
//! |------------|----------------------------------------------|
//! | Space      | microphone button (start or stop the call)   |
//! | Enter      | SDK reports the call started                 |
//! | S          | SDK reports speech started / ended           |
//! | X          | SDK reports the call ended                   |
//! | T          | SDK reports an assistant transcript          |
//! | E          | SDK reports an error                         |
//! | P          | pause / resume                               |
//! | Escape     | quit                                         |
//!
//! The mouse wheel zooms the camera. The title shows the call status, the last
//! assistant line and the measured frame rate.

use std::sync::Arc;

use tracing::{debug, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::config::SwirlConfig;
use crate::error::RunError;
use crate::gpu::{GpuState, RenderSettings};
use crate::swirl::Swirl;
use crate::time::Time;
use crate::voice::{Role, Subscription, VoiceEvent, VoiceMirror, VoiceState};

/// Frames between window title refreshes.
const TITLE_REFRESH_FRAMES: u64 = 30;
/// Longest transcript excerpt shown in the title, in characters.
const TRANSCRIPT_PREVIEW_CHARS: usize = 60;

/// Window title: base title, voice status, latest assistant line and FPS.
pub fn format_title(base: &str, status: Option<&str>, transcript: &str, fps: f32) -> String {
    let mut title = base.to_string();
    if let Some(status) = status {
        title.push_str(" - ");
        title.push_str(status);
    }
    let transcript = transcript.trim();
    if !transcript.is_empty() {
        let mut preview: String = transcript.chars().take(TRANSCRIPT_PREVIEW_CHARS).collect();
        if transcript.chars().count() > TRANSCRIPT_PREVIEW_CHARS {
            preview.push_str("...");
        }
        title.push_str(&format!(" - \"{preview}\""));
    }
    if fps > 0.0 {
        title.push_str(&format!(" ({fps:.0} fps)"));
    }
    title
}

pub struct App {
    title: String,
    size: (u32, u32),
    settings: RenderSettings,
    swirl: Swirl,
    time: Time,
    mirror: VoiceMirror,
    subscription: Subscription,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    /// First fatal error; reported once the event loop returns.
    failure: Option<RunError>,
}

impl App {
    pub fn new(config: &SwirlConfig, swirl: Swirl) -> Result<Self, RunError> {
        let settings = RenderSettings::from_config(config)?;
        let mut mirror = VoiceMirror::new();
        let subscription = mirror.subscribe();
        Ok(Self {
            title: config.view.title.clone(),
            size: (config.view.width, config.view.height),
            settings,
            swirl,
            time: Time::new(),
            mirror,
            subscription,
            window: None,
            gpu_state: None,
            failure: None,
        })
    }

    /// Feed a voice event as if it came from the SDK.
    pub fn voice_event(&mut self, event: VoiceEvent) {
        self.mirror.handle(event);
        if let Some(window) = &self.window {
            window.set_title(&self.window_title());
        }
    }

    fn window_title(&self) -> String {
        format_title(
            &self.title,
            self.mirror.state().status_label(),
            self.mirror.transcript(),
            self.time.fps(),
        )
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };

        match code {
            KeyCode::Space if self.mirror.button_enabled() => {
                let event = if self.mirror.state() == VoiceState::Idle {
                    VoiceEvent::StartRequested
                } else {
                    VoiceEvent::StopRequested
                };
                self.voice_event(event);
            }
            KeyCode::Enter => self.voice_event(VoiceEvent::CallStart),
            KeyCode::KeyS => {
                let event = if self.mirror.state() == VoiceState::UserSpeaking {
                    VoiceEvent::SpeechEnd
                } else {
                    VoiceEvent::SpeechStart
                };
                self.voice_event(event);
            }
            KeyCode::KeyX => self.voice_event(VoiceEvent::CallEnd),
            KeyCode::KeyT => self.voice_event(VoiceEvent::Transcript {
                role: Role::Assistant,
                text: "Hello! How can I help you today?".into(),
            }),
            KeyCode::KeyE => self.voice_event(VoiceEvent::Error("simulated error".into())),
            KeyCode::KeyP => {
                self.time.toggle_pause();
                info!(paused = self.time.is_paused(), "toggled pause");
            }
            KeyCode::Escape => event_loop.exit(),
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.time.update();
        self.swirl.sync(&self.subscription);
        self.swirl.frame(&self.time);

        if let Some(gpu_state) = &mut self.gpu_state {
            let snapshot = self.swirl.snapshot();
            match gpu_state.render(&snapshot, self.time.elapsed()) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    warn!("GPU out of memory, exiting");
                    event_loop.exit();
                }
                Err(e) => warn!("render error: {e:?}"),
            }
        }

        if let Some(window) = &self.window {
            if self.time.frame() % TITLE_REFRESH_FRAMES == 0 {
                window.set_title(&self.window_title());
                debug!(fps = self.time.fps(), frame = self.time.frame(), "frame stats");
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.window_title())
            .with_inner_size(winit::dpi::LogicalSize::new(self.size.0, self.size.1));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.failure = Some(e.into());
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let snapshot = self.swirl.snapshot();
        match pollster::block_on(GpuState::new(window, self.settings, &snapshot)) {
            Ok(gpu_state) => self.gpu_state = Some(gpu_state),
            Err(e) => {
                self.failure = Some(e.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.on_key(event_loop, event),
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.zoom(scroll * 0.3);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Open a window and run the visualizer until it is closed.
///
/// With `start_listening` the call is put straight into the listening state.
pub fn run(config: &SwirlConfig, swirl: Swirl, start_listening: bool) -> Result<(), RunError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, swirl)?;
    if start_listening {
        app.voice_event(VoiceEvent::StartRequested);
        app.voice_event(VoiceEvent::CallStart);
    }

    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_title_is_base() {
        assert_eq!(format_title("Cosmic Swirl", None, "", 0.0), "Cosmic Swirl");
    }

    #[test]
    fn test_title_shows_status_transcript_and_fps() {
        let title = format_title("Cosmic Swirl", Some("Listening..."), "Hi there", 59.6);
        assert_eq!(title, "Cosmic Swirl - Listening... - \"Hi there\" (60 fps)");
    }

    #[test]
    fn test_long_transcript_is_shortened() {
        let long = "é".repeat(200);
        let title = format_title("T", None, &long, 0.0);
        assert!(title.ends_with("...\""));
        assert_eq!(title.chars().filter(|&c| c == 'é').count(), TRANSCRIPT_PREVIEW_CHARS);
    }
}
