use crate::clock::Clock;
use crate::model::{Effect, SleepPhase};
use crate::pet::Pet;
use crate::room::{Location, Point};

const WAYPOINT_REACHED_PX: f32 = 2.0;

impl<C: Clock> Pet<C> {
    /// One fixed motion step: idle transitions, expiries, then one move
    /// toward the current goal.
    pub(crate) fn motion_tick(&mut self) {
        self.update_idle();

        let now = self.now();
        if self.state.effect != Effect::None && now >= self.state.effect_expires_at {
            self.state.effect = Effect::None;
            self.state.effect_expires_at = 0;
        }
        if !self.state.bubble.text.is_empty() && !self.state.bubble.is_live(now) {
            self.clear_bubble();
        }
        if self.state.jump_until != 0 && now >= self.state.jump_until {
            self.state.jump_until = 0;
        }

        self.sanitize_motion();
        self.step_toward_goal();
    }

    fn sanitize_motion(&mut self) {
        if !self.state.position.is_finite() {
            tracing::warn!("non-finite position, recentering");
            self.state.position = self.room.nearest_walkable(Location::Center.point());
            self.state.escape_waypoint = None;
        }
        if !self.state.target.is_finite() {
            self.state.target = self.state.position;
        }
        if matches!(self.state.escape_waypoint, Some(wp) if !wp.is_finite()) {
            self.state.escape_waypoint = None;
        }
    }

    fn step_toward_goal(&mut self) {
        let pos = self.state.position;
        if let Some(wp) = self.state.escape_waypoint {
            if pos.dist(wp) < WAYPOINT_REACHED_PX {
                self.state.escape_waypoint = None;
            }
        }
        let goal = self.state.escape_waypoint.unwrap_or(self.state.target);

        let dist = pos.dist(goal);
        if dist < self.rules.arrive_px {
            self.state.stuck_ticks = 0;
            return;
        }
        let step = self.rules.speed.min(dist);
        let dx = (goal.x - pos.x) / dist * step;
        let dy = (goal.y - pos.y) / dist * step;
        let diagonal = Point::new(pos.x + dx, pos.y + dy);

        let pass_through = self.room.is_blocked(pos)
            || self.state.sleep_phase == SleepPhase::MovingToBed
            || self.room.inside_obstacle(self.state.target);
        if pass_through {
            self.state.position = diagonal;
            self.state.stuck_ticks = 0;
            return;
        }

        let horizontal = Point::new(pos.x + dx, pos.y);
        let vertical = Point::new(pos.x, pos.y + dy);
        let next = [diagonal, horizontal, vertical]
            .into_iter()
            .find(|&p| !self.room.is_blocked(p))
            .unwrap_or(pos);
        self.state.position = next;

        if pos.dist(next) >= self.rules.stuck_move_px {
            self.state.stuck_ticks = 0;
            return;
        }
        self.state.stuck_ticks += 1;
        if self.state.stuck_ticks < self.rules.stuck_ticks {
            return;
        }
        self.state.stuck_ticks = 0;

        if self.state.escape_waypoint.take().is_some() {
            tracing::debug!("waypoint unreachable, dropped");
            return;
        }
        match self.compute_detour(diagonal) {
            Some(wp) => {
                tracing::debug!(x = wp.x, y = wp.y, "detour waypoint");
                self.state.escape_waypoint = Some(wp);
            }
            None => tracing::debug!(x = pos.x, y = pos.y, "stuck with no detour"),
        }
    }

    /// Best one-bend detour around the obstacle covering `blocked`: a point
    /// just outside it that the pet can walk to in a straight line and from
    /// which an L-shaped path reaches the target.
    pub(crate) fn compute_detour(&self, blocked: Point) -> Option<Point> {
        let idx = self.room.obstacle_at(blocked)?;
        let r = self.room.obstacles[idx]
            .expand(self.room.pet_radius)
            .expand(self.rules.detour_margin);
        let p = self.state.position;
        let t = self.state.target;

        let candidates = [
            Point::new(r.x1, r.y1),
            Point::new(r.x2, r.y1),
            Point::new(r.x1, r.y2),
            Point::new(r.x2, r.y2),
            Point::new(r.x1, p.y),
            Point::new(r.x2, p.y),
            Point::new(p.x, r.y1),
            Point::new(p.x, r.y2),
            Point::new(r.x1, t.y),
            Point::new(r.x2, t.y),
            Point::new(t.x, r.y1),
            Point::new(t.x, r.y2),
        ];

        candidates
            .into_iter()
            .filter(|&c| !self.room.is_blocked(c) && self.room.segment_clear(p, c))
            .filter_map(|c| {
                let corner = self.room.l_path_corner(c, t)?;
                Some((c, p.dist(c) + c.dist(corner) + corner.dist(t)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
    }
}
