use leptos::prelude::*;
use leptos::server_fn::error::NoCustomError;

use crate::data::booking::{categorize, BookingConfig, BookingSummary};
use crate::pages::booking::get_booking_config;
use crate::pages::modify_booking::ModifyBooking;
use crate::pages::server_error_message;
use crate::utils::date::{format_iso_date, format_time_slot};

#[server(GetMyBookings)]
pub async fn get_my_bookings() -> Result<Vec<BookingSummary>, ServerFnError> {
    use crate::data::api::PlekApi;
    use crate::settings::Settings;

    let settings = Settings::from_yaml("settings.yaml")
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))?;

    PlekApi::new(&settings)
        .my_bookings()
        .await
        .map_err(|e| ServerFnError::<NoCustomError>::ServerError(e.to_string()))
}

fn status_color_class(status: &str) -> &'static str {
    match status.to_ascii_lowercase().as_str() {
        "approved" => "bg-green-100 text-green-800",
        "pending" => "bg-yellow-100 text-yellow-800",
        "rejected" | "cancelled" => "bg-red-100 text-red-800",
        _ => "bg-gray-100 text-gray-800",
    }
}

#[component]
pub fn MyBookingsPage() -> impl IntoView {
    let (bookings, set_bookings) = create_signal(Vec::<BookingSummary>::new());
    let (is_loading, set_is_loading) = create_signal(true);
    let (load_error, set_load_error) = create_signal::<Option<String>>(None);
    let (selected, set_selected) = create_signal::<Option<BookingSummary>>(None);
    let (config, set_config) = create_signal(BookingConfig::default());

    let fetch_bookings = move || {
        set_is_loading.set(true);
        leptos::task::spawn_local(async move {
            match get_my_bookings().await {
                Ok(data) => {
                    set_bookings.set(data);
                    set_load_error.set(None);
                }
                Err(err) => {
                    leptos::logging::log!("Error fetching bookings: {:?}", err);
                    set_load_error.set(Some(server_error_message(&err)));
                }
            }
            set_is_loading.set(false);
        });
    };

    #[cfg(not(feature = "ssr"))]
    fetch_bookings();

    #[cfg(not(feature = "ssr"))]
    leptos::task::spawn_local(async move {
        if let Ok(fetched) = get_booking_config().await {
            set_config.set(fetched);
        }
    });

    let split = create_memo(move |_| categorize(bookings.get(), config.get().now()));

    let render_rows = move |items: Vec<BookingSummary>, modifiable: bool| {
        let zone = config.get().zone();
        items
            .into_iter()
            .map(|booking| {
                let row = booking.clone();
                view! {
                    <tr class="border-b border-gray-100">
                        <td class="px-4 py-3">
                            <div class="font-medium text-gray-800">{booking.room.name.clone()}</div>
                            <div class="text-xs text-gray-500">
                                {booking.room.building_name.clone().unwrap_or_default()}
                            </div>
                        </td>
                        <td class="px-4 py-3 text-sm text-gray-600">
                            {format_iso_date(&booking.start_time, zone)}
                        </td>
                        <td class="px-4 py-3 text-sm text-gray-600">
                            {format_time_slot(&booking.start_time, &booking.end_time, zone)}
                        </td>
                        <td class="px-4 py-3">
                            <span class=format!(
                                "px-2 py-1 rounded-full text-xs font-medium {}",
                                status_color_class(&booking.status),
                            )>{booking.status.clone()}</span>
                        </td>
                        <td class="px-4 py-3 text-right">
                            {if modifiable {
                                view! {
                                    <button
                                        class="px-3 py-1.5 text-sm bg-purple-600 text-white rounded-md hover:bg-purple-700"
                                        on:click=move |_| set_selected.set(Some(row.clone()))
                                    >
                                        "Modify"
                                    </button>
                                }
                                .into_any()
                            } else {
                                view! { <span class="hidden"></span> }.into_any()
                            }}
                        </td>
                    </tr>
                }
            })
            .collect::<Vec<_>>()
    };

    let booking_table = move |items: Vec<BookingSummary>, modifiable: bool, empty: &'static str| {
        if items.is_empty() {
            view! { <div class="text-sm text-gray-500 py-4">{empty}</div> }.into_any()
        } else {
            view! {
                <div class="overflow-x-auto border border-gray-200 rounded-lg">
                    <table class="min-w-full divide-y divide-gray-200">
                        <thead class="bg-gray-50">
                            <tr>
                                <th class="px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase">"Room"</th>
                                <th class="px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase">"Date"</th>
                                <th class="px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase">"Time"</th>
                                <th class="px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase">"Status"</th>
                                <th class="px-4 py-2"></th>
                            </tr>
                        </thead>
                        <tbody class="bg-white divide-y divide-gray-100">
                            {render_rows(items, modifiable)}
                        </tbody>
                    </table>
                </div>
            }
            .into_any()
        }
    };

    view! {
        <div class="max-w-5xl mx-auto p-4">
            <div class="flex justify-between items-center mb-6">
                <h2 class="text-2xl font-bold text-gray-800">"My bookings"</h2>
            </div>

            {move || match load_error.get() {
                Some(message) => view! {
                    <div class="text-sm mb-4 text-amber-600">{message}</div>
                }
                .into_any(),
                None => view! { <div class="hidden"></div> }.into_any(),
            }}

            {move || {
                if is_loading.get() {
                    view! {
                        <div class="text-sm text-gray-500 py-8">"Loading bookings..."</div>
                    }
                    .into_any()
                } else {
                    let (upcoming, previous) = split.get();
                    view! {
                        <div>
                            <h3 class="text-lg font-semibold text-gray-700 mb-2">"Upcoming"</h3>
                            {booking_table(upcoming, true, "No upcoming bookings.")}
                            <h3 class="text-lg font-semibold text-gray-700 mt-8 mb-2">"Previous"</h3>
                            {booking_table(previous, false, "No previous bookings.")}
                        </div>
                    }
                    .into_any()
                }
            }}

            {move || match selected.get() {
                Some(booking) => view! {
                    <ModifyBooking
                        booking=booking
                        on_close=Callback::new(move |_| set_selected.set(None))
                        on_done=Callback::new(move |_| {
                            set_selected.set(None);
                            fetch_bookings();
                        })
                    />
                }
                .into_any(),
                None => view! { <div class="hidden"></div> }.into_any(),
            }}
        </div>
    }
}
