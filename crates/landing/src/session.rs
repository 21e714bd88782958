//! The landing sequence as one owned session object.
//!
//! `SceneSession` owns the world, the camera and every pending timer. The host feeds it
//! frame deltas through [`SceneSession::tick`] and forwards clicks and orbit input; the
//! session never reads a clock on its own, so a run is fully reproducible.

use std::time::Duration;

use engine_core::{Entity, TimerId, Timers, Transform, World};
use glam::Vec3;
use procgen::{furnished_room, BlobPlanet, StarField};
use renderer::Camera;

use crate::camera_path::{boosted_progress, progress, travel_pose, EnterPath};
use crate::config::{OrbitConfig, SequenceConfig};
use crate::orbit::OrbitControls;
use crate::overlay::{format_datetime, Countdown, DateSource, LocalClock, Overlay, TextAnchor, TypedPrompt};
use crate::phase::{Phase, PhaseMachine};
use crate::scene::{room_piece_count, spawn_planet, spawn_room, spawn_star_field};

/// Clear colour before the room is built.
pub const SPACE_BACKGROUND: u32 = 0x000000;

/// Scheduled steps of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    LoadingDone,
    CountdownStep,
    TravelDone,
    ShowPrompt,
    TypeChar,
    EnterDone,
    ClockTick,
}

pub struct SceneSession {
    config: SequenceConfig,
    world: World,
    camera: Camera,
    phases: PhaseMachine,
    timers: Timers<SequenceEvent>,
    planet_position: Vec3,
    star_field: Option<Entity>,
    planet: Option<Entity>,
    room: Vec<Entity>,
    background: u32,
    overlay: Overlay,
    countdown: Option<(Countdown, TimerId)>,
    prompt: Option<(TypedPrompt, TimerId)>,
    click_armed: bool,
    enter_path: Option<EnterPath>,
    orbit: OrbitControls,
    clock: Box<dyn DateSource>,
}

impl SceneSession {
    /// Build the opening scene: star field, camera at the origin, loading screen up.
    pub fn new(config: SequenceConfig, orbit: OrbitConfig) -> Self {
        let mut world = World::new();
        let star_field = spawn_star_field(&mut world, &config.star_field());

        let mut timers = Timers::new();
        timers.after(config.loading_delay(), SequenceEvent::LoadingDone);

        let [x, y, z] = config.planet_position;
        let overlay = Overlay::new(config.header_text.clone());

        Self {
            planet_position: Vec3::new(x, y, z),
            world,
            camera: Camera::new(Vec3::ZERO),
            phases: PhaseMachine::new(),
            timers,
            star_field: Some(star_field),
            planet: None,
            room: Vec::new(),
            background: SPACE_BACKGROUND,
            overlay,
            countdown: None,
            prompt: None,
            click_armed: false,
            enter_path: None,
            orbit: OrbitControls::new(orbit),
            clock: Box::new(LocalClock),
            config,
        }
    }

    /// Replace the date source used by the room clock.
    pub fn with_clock(mut self, clock: Box<dyn DateSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Advance the sequence by `dt`.
    ///
    /// Timers due inside the step fire in deadline order, each at its own deadline. The
    /// step is split at every deadline so each piece runs the planet clock of the phase
    /// it was spent in. Poses are then set once for the end of the step.
    pub fn tick(&mut self, dt: Duration) {
        let until = self.timers.now() + dt;
        let mut cursor = self.timers.now();
        while let Some(fired) = self.timers.pop_due(until) {
            self.run_planet_clock(cursor, fired.at);
            cursor = fired.at;
            log::debug!("{:?} at {:.3}s", fired.event, fired.at.as_secs_f32());
            self.dispatch(fired.event, fired.at);
        }
        self.timers.advance_to(until);
        self.run_planet_clock(cursor, until);
        self.animate(until);
    }

    /// Forward a left click. Returns true if it started the room entry.
    pub fn click(&mut self) -> bool {
        if !self.click_armed {
            return false;
        }
        self.click_armed = false;
        self.overlay.hide_text();

        let now = self.timers.now();
        if !self.transition(Phase::EnteringRoom, now) {
            return false;
        }
        self.enter_path = Some(EnterPath::new(
            self.camera.position(),
            self.planet_position,
            Vec3::from(self.config.room_eye),
            Vec3::from(self.config.room_target),
        ));
        self.timers
            .after(self.config.enter_duration(), SequenceEvent::EnterDone);
        true
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        self.orbit.rotate(dx, dy, viewport_height);
    }

    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        self.orbit.pan(dx, dy, viewport_height, &self.camera);
    }

    pub fn zoom(&mut self, lines: f32) {
        self.orbit.zoom(lines);
    }

    pub fn phase(&self) -> Phase {
        self.phases.current()
    }

    pub fn phases(&self) -> &PhaseMachine {
        &self.phases
    }

    /// Simulated time since the session started.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn background(&self) -> u32 {
        self.background
    }

    pub fn star_field(&self) -> Option<Entity> {
        self.star_field
    }

    pub fn planet(&self) -> Option<Entity> {
        self.planet
    }

    pub fn room(&self) -> &[Entity] {
        &self.room
    }

    pub fn room_piece_count(&self) -> usize {
        room_piece_count(&self.world)
    }

    pub fn is_click_armed(&self) -> bool {
        self.click_armed
    }

    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    /// The entity the current phase animates, if any.
    pub fn active_entity(&self) -> Option<Entity> {
        match self.phases.current() {
            Phase::SpaceTravel => self.star_field,
            Phase::BlobPlanet | Phase::EnteringRoom => self.planet,
            Phase::Loading | Phase::Room => None,
        }
    }

    fn transition(&mut self, to: Phase, at: Duration) -> bool {
        match self.phases.advance(to, at) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("{}", err);
                false
            }
        }
    }

    fn dispatch(&mut self, event: SequenceEvent, at: Duration) {
        match event {
            SequenceEvent::LoadingDone => self.start_travel(at),
            SequenceEvent::CountdownStep => self.step_countdown(),
            SequenceEvent::TravelDone => self.arrive_at_planet(at),
            SequenceEvent::ShowPrompt => self.show_prompt(),
            SequenceEvent::TypeChar => self.type_char(),
            SequenceEvent::EnterDone => self.enter_room(at),
            SequenceEvent::ClockTick => self.update_datetime(),
        }
    }

    fn start_travel(&mut self, at: Duration) {
        if !self.transition(Phase::SpaceTravel, at) {
            return;
        }
        self.overlay.loading_visible = false;
        self.planet = Some(spawn_planet(
            &mut self.world,
            self.planet_position,
            self.config.planet_radius,
            self.config.planet_detail,
        ));

        let countdown = Countdown::new(self.config.planet_name.clone(), self.config.countdown_from);
        if !countdown.is_finished() {
            self.overlay.show_text(countdown.text(), TextAnchor::COUNTDOWN);
            let timer = self
                .timers
                .every(self.config.countdown_interval(), SequenceEvent::CountdownStep);
            self.countdown = Some((countdown, timer));
        }

        self.timers
            .after(self.config.travel_duration(), SequenceEvent::TravelDone);
    }

    fn step_countdown(&mut self) {
        let Some((countdown, timer)) = self.countdown.as_mut() else {
            return;
        };
        let finished = countdown.step();
        let text = countdown.text();
        let timer = *timer;

        if finished {
            self.timers.cancel(timer);
            self.countdown = None;
            if self.overlay.shows_at(TextAnchor::COUNTDOWN) {
                self.overlay.hide_text();
            }
        } else if self.prompt.is_none() {
            self.overlay.show_text(text, TextAnchor::COUNTDOWN);
        }
    }

    fn arrive_at_planet(&mut self, at: Duration) {
        let pose = travel_pose(1.0, self.config.travel_distance, self.planet_position);
        self.camera.set_pose(pose.position, pose.rotation);
        if !self.transition(Phase::BlobPlanet, at) {
            return;
        }
        self.timers
            .after(self.config.prompt_delay(), SequenceEvent::ShowPrompt);
    }

    fn show_prompt(&mut self) {
        let prompt = TypedPrompt::new(self.config.prompt_text.clone());
        self.overlay.show_text(prompt.text(), TextAnchor::PROMPT);
        let timer = self
            .timers
            .every(self.config.type_interval(), SequenceEvent::TypeChar);
        self.prompt = Some((prompt, timer));
    }

    fn type_char(&mut self) {
        let Some((prompt, timer)) = self.prompt.as_mut() else {
            return;
        };
        let finished = prompt.next_char();
        let text = prompt.text().to_string();
        let timer = *timer;

        self.overlay.show_text(text, TextAnchor::PROMPT);
        if finished {
            self.timers.cancel(timer);
            self.prompt = None;
            self.click_armed = true;
            log::info!("Prompt typed, waiting for click");
        }
    }

    fn enter_room(&mut self, at: Duration) {
        if let Some(path) = &self.enter_path {
            let end = path.sample(1.0).pose;
            self.camera.set_pose(end.position, end.rotation);
        }
        self.despawn_star_field();
        self.despawn_planet();
        self.enter_path = None;

        if !self.transition(Phase::Room, at) {
            return;
        }

        let layout = furnished_room();
        self.room = spawn_room(&mut self.world, &layout);
        self.background = layout.background;

        let target = Vec3::from(self.config.room_target);
        self.camera.transform.position = Vec3::from(self.config.room_eye);
        self.camera.look_at(target);
        self.orbit.enable(target);

        self.overlay.header_visible = true;
        self.update_datetime();
        self.timers
            .every(self.config.clock_interval(), SequenceEvent::ClockTick);
    }

    fn update_datetime(&mut self) {
        self.overlay.datetime = format_datetime(&self.clock.now());
    }

    /// Advance the planet clock over `[from, to]`, all of it spent in the current phase.
    fn run_planet_clock(&mut self, from: Duration, to: Duration) {
        let span = to.saturating_sub(from).as_secs_f32();
        let amount = match self.phases.current() {
            Phase::SpaceTravel | Phase::BlobPlanet => self.config.planet_time_rate * span,
            Phase::EnteringRoom => {
                let duration = self.config.enter_duration();
                let boosted = boosted_progress(
                    progress(self.phases.elapsed(from), duration),
                    progress(self.phases.elapsed(to), duration),
                );
                self.config.planet_push_time_rate * boosted * duration.as_secs_f32()
            }
            Phase::Loading | Phase::Room => 0.0,
        };
        if amount > 0.0 {
            self.advance_planet_time(amount);
        }
    }

    fn animate(&mut self, now: Duration) {
        match self.phases.current() {
            Phase::Loading => {}
            Phase::SpaceTravel => {
                if let Some(entity) = self.star_field {
                    if let Ok(mut field) = self.world.get::<&mut StarField>(entity) {
                        field.advance();
                    }
                }
                let t = progress(self.phases.elapsed(now), self.config.travel_duration());
                let pose = travel_pose(t, self.config.travel_distance, self.planet_position);
                self.camera.set_pose(pose.position, pose.rotation);
            }
            Phase::BlobPlanet => {}
            Phase::EnteringRoom => self.animate_entry(now),
            Phase::Room => {
                self.orbit.update(&mut self.camera);
            }
        }
    }

    fn animate_entry(&mut self, now: Duration) {
        let Some(path) = self.enter_path else {
            return;
        };
        let t = progress(self.phases.elapsed(now), self.config.enter_duration());
        let sample = path.sample(t);
        self.camera.set_pose(sample.pose.position, sample.pose.rotation);

        if let Some(entity) = self.planet {
            if let Ok(mut transform) = self.world.get::<&mut Transform>(entity) {
                transform.set_uniform_scale(sample.planet_scale);
            }
            if let Ok(mut planet) = self.world.get::<&mut BlobPlanet>(entity) {
                planet.opacity = sample.planet_opacity;
            }
        }
        if !sample.stars_visible {
            self.despawn_star_field();
        }
        if !sample.planet_visible {
            self.despawn_planet();
        }
    }

    fn advance_planet_time(&mut self, amount: f32) {
        if let Some(entity) = self.planet {
            if let Ok(mut planet) = self.world.get::<&mut BlobPlanet>(entity) {
                planet.time += amount;
            }
        }
    }

    fn despawn_star_field(&mut self) {
        if let Some(entity) = self.star_field.take() {
            self.world.despawn(entity).ok();
            log::debug!("Star field removed");
        }
    }

    fn despawn_planet(&mut self) {
        if let Some(entity) = self.planet.take() {
            self.world.despawn(entity).ok();
            log::debug!("Planet removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SequenceConfig {
        SequenceConfig {
            star_count: 64,
            planet_detail: 1,
            ..SequenceConfig::default()
        }
    }

    fn session() -> SceneSession {
        SceneSession::new(small_config(), OrbitConfig::default())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn starts_loading_with_only_stars() {
        let session = session();
        assert_eq!(session.phase(), Phase::Loading);
        assert!(session.overlay().loading_visible);
        assert!(session.star_field().is_some());
        assert!(session.planet().is_none());
        assert!(session.active_entity().is_none());
        assert_eq!(session.background(), SPACE_BACKGROUND);
    }

    #[test]
    fn loading_ends_after_delay() {
        let mut session = session();
        session.tick(ms(2999));
        assert_eq!(session.phase(), Phase::Loading);
        session.tick(ms(1));
        assert_eq!(session.phase(), Phase::SpaceTravel);
        assert!(!session.overlay().loading_visible);
        assert!(session.planet().is_some());
        assert_eq!(session.active_entity(), session.star_field());
    }

    #[test]
    fn countdown_runs_then_hides() {
        let mut session = session();
        session.tick(ms(3000));
        let text = |s: &SceneSession| s.overlay().text.as_ref().map(|t| t.content.clone());
        assert_eq!(text(&session).as_deref(), Some("Arriving at Planet Nife in 3..."));
        session.tick(ms(1500));
        assert_eq!(text(&session).as_deref(), Some("Arriving at Planet Nife in 2..."));
        session.tick(ms(1500));
        assert_eq!(text(&session).as_deref(), Some("Arriving at Planet Nife in 1..."));
        session.tick(ms(1500));
        assert!(session.overlay().text.is_none());
    }

    #[test]
    fn travel_moves_camera_towards_planet() {
        let mut session = session();
        session.tick(ms(3000));
        session.tick(ms(2500));
        let z = session.camera().position().z;
        assert!((z - 40.0).abs() < 1e-3, "camera z was {z}");
        assert!(session.camera().forward().abs_diff_eq(Vec3::Z, 1e-4));
    }

    #[test]
    fn travel_recycles_stars_every_frame() {
        let mut session = session();
        session.tick(ms(3000));
        let entity = session.star_field().unwrap();
        let before: Vec<Vec3> = session
            .world()
            .get::<&StarField>(entity)
            .unwrap()
            .positions()
            .to_vec();
        session.tick(ms(16));
        let field = session.world().get::<&StarField>(entity).unwrap();
        for (old, new) in before.iter().zip(field.positions()) {
            assert_eq!((old.x, old.y), (new.x, new.y));
            assert_ne!(old.z, new.z);
        }
    }

    #[test]
    fn clicks_before_prompt_finishes_are_ignored() {
        let mut session = session();
        assert!(!session.click());
        session.tick(ms(8000));
        assert_eq!(session.phase(), Phase::BlobPlanet);
        assert!(!session.click());
        session.tick(ms(500 + 1000));
        assert!(!session.is_click_armed());
        assert!(!session.click());
        assert_eq!(session.phase(), Phase::BlobPlanet);
    }

    #[test]
    fn prompt_types_then_arms_a_single_click() {
        let mut session = session();
        session.tick(ms(8500));
        session.tick(ms(1000));
        let typed = session.overlay().text.as_ref().unwrap();
        assert_eq!(typed.content, "click anyw");
        assert_eq!(typed.anchor, TextAnchor::PROMPT);

        session.tick(ms(1300));
        assert!(session.is_click_armed());
        assert!(session.click());
        assert!(!session.click());
        assert_eq!(session.phase(), Phase::EnteringRoom);
        assert!(session.overlay().text.is_none());
    }

    #[test]
    fn planet_time_runs_outside_entry() {
        let mut session = session();
        session.tick(ms(3000));
        let planet = session.planet().unwrap();
        session.tick(ms(1000));
        let time = session.world().get::<&BlobPlanet>(planet).unwrap().time;
        assert!((time - 0.9).abs() < 1e-4);
    }

    #[test]
    fn planet_clock_splits_a_step_at_arrival() {
        let mut session = session();
        session.tick(ms(3000));
        let planet = session.planet().unwrap();
        // 5 s of travel then 0.5 s at the planet, one step.
        session.tick(ms(5500));
        assert_eq!(session.phase(), Phase::BlobPlanet);
        let time = session.world().get::<&BlobPlanet>(planet).unwrap().time;
        assert!((time - 4.95).abs() < 1e-4, "{time}");
    }

    #[test]
    fn orbit_input_is_ignored_before_room() {
        let mut session = session();
        session.tick(ms(3000));
        session.zoom(10.0);
        session.rotate(300.0, 0.0, 720.0);
        assert!(!session.orbit().is_enabled());
    }
}
