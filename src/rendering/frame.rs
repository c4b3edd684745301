/// 每帧上传策略：记录本轮事件处理中模型 / 投影矩阵是否改变。
///
/// 首帧两个标记都为真以强制初始上传；`take` 读出后清零，
/// 所以一帧内无论多少事件触碰同一矩阵，最多只上传一次。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameUpdates {
    model: bool,
    proj: bool,
}

/// 本帧需要上传的矩阵。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSignals {
    pub model: bool,
    pub proj: bool,
}

impl Default for FrameUpdates {
    fn default() -> Self {
        Self {
            model: true,
            proj: true,
        }
    }
}

impl FrameUpdates {
    pub fn mark_model(&mut self) {
        self.model = true;
    }

    pub fn mark_proj(&mut self) {
        self.proj = true;
    }

    pub fn take(&mut self) -> FrameSignals {
        let signals = FrameSignals {
            model: self.model,
            proj: self.proj,
        };
        self.model = false;
        self.proj = false;
        signals
    }
}
