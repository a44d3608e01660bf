// kernel/src/logging/itm.rs
//
// ITM stimulus port 0 への最小限の出力（SWO 経由でデバッガが拾う）。
// - ITM 自体 (TCR.ITMENA) と port 0 (TER[0]) が有効なときだけ書く
//   デバッガ未接続で無効のまま書くと FIFO ready を待ち続けて止まるため。

use cortex_m::peripheral::ITM;

use super::LogSink;

pub struct ItmSink;

pub static ITM_SINK: ItmSink = ItmSink;

const TCR_ITMENA: u32 = 1 << 0;
const TER_PORT0: u32 = 1 << 0;

impl LogSink for ItmSink {
    fn write_str(&self, s: &str) {
        // Safety: ITM は固定番地のペリフェラル。logging のロック内でのみ触る
        let itm = unsafe { &mut *(ITM::PTR as *mut cortex_m::peripheral::itm::RegisterBlock) };

        if itm.tcr.read() & TCR_ITMENA == 0 || itm.ter[0].read() & TER_PORT0 == 0 {
            return;
        }
        cortex_m::itm::write_str(&mut itm.stim[0], s);
    }
}
