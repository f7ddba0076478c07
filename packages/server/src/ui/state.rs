//! Shared application state and its wiring.

use std::sync::Arc;

use crate::{
    config::TimingConfig,
    domain::{MessagePusher, RoomRepository},
    usecase::{
        BroadcastScheduler, CreateRoomUseCase, DisconnectConnectionUseCase, EnterRoomUseCase,
        GetRoomDetailUseCase, GetRoomsUseCase, HeartbeatTracker, LeaveRoomUseCase,
        LivenessMonitor, SendChatUseCase, TransferMicUseCase, UpdateControllerUseCase,
    },
};

pub struct AppState {
    /// Transport primitives (send, groups, disconnect)
    pub message_pusher: Arc<dyn MessagePusher>,
    /// Per-connection periodic delivery
    pub scheduler: Arc<BroadcastScheduler>,
    /// Last heartbeat per tracked connection
    pub heartbeat_tracker: Arc<HeartbeatTracker>,
    /// Process-wide eviction sweep, spawned by the server
    pub liveness_monitor: Arc<LivenessMonitor>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub enter_room_usecase: Arc<EnterRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub send_chat_usecase: Arc<SendChatUseCase>,
    pub update_controller_usecase: Arc<UpdateControllerUseCase>,
    pub transfer_mic_usecase: Arc<TransferMicUseCase>,
    pub disconnect_usecase: Arc<DisconnectConnectionUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
}

impl AppState {
    /// Wire every component around one registry and one transport.
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        timing: &TimingConfig,
    ) -> Self {
        // 1. Delivery and liveness bookkeeping
        let scheduler = Arc::new(BroadcastScheduler::new(
            repository.clone(),
            message_pusher.clone(),
            timing.tick_interval,
        ));
        let heartbeat_tracker = Arc::new(HeartbeatTracker::new());

        // 2. Teardown, shared by socket close and liveness eviction
        let disconnect_usecase = Arc::new(DisconnectConnectionUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            scheduler.clone(),
            heartbeat_tracker.clone(),
        ));
        let liveness_monitor = Arc::new(LivenessMonitor::new(
            heartbeat_tracker.clone(),
            message_pusher.clone(),
            disconnect_usecase.clone(),
            timing,
        ));

        // 3. Event use cases
        Self {
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                scheduler.clone(),
                heartbeat_tracker.clone(),
            )),
            enter_room_usecase: Arc::new(EnterRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                scheduler.clone(),
                heartbeat_tracker.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                scheduler.clone(),
            )),
            send_chat_usecase: Arc::new(SendChatUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            update_controller_usecase: Arc::new(UpdateControllerUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            transfer_mic_usecase: Arc::new(TransferMicUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository)),
            disconnect_usecase,
            liveness_monitor,
            heartbeat_tracker,
            scheduler,
            message_pusher,
        }
    }
}
